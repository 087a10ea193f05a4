use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use gridfill_engine::HighScoreStore;

use crate::{
    schema::high_score::HighScoreRecord,
    util::{Output, read_json_file},
};

/// High score persisted as a small JSON file.
///
/// A missing file reads as a high score of 0 and is created on the first save.
#[derive(Debug)]
pub struct JsonHighScoreFile {
    path: PathBuf,
    record: HighScoreRecord,
}

impl JsonHighScoreFile {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let record = if path.exists() {
            read_json_file("high score", path)?
        } else {
            HighScoreRecord::default()
        };
        Ok(Self {
            path: path.to_owned(),
            record,
        })
    }

    pub fn record(&self) -> &HighScoreRecord {
        &self.record
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sets the high score back to 0 and writes the file.
    pub fn reset(&mut self) -> anyhow::Result<()> {
        self.store(0)
    }

    /// Writes `high_score` to the file, and keeps it only once the write succeeded.
    fn store(&mut self, high_score: usize) -> anyhow::Result<()> {
        let record = HighScoreRecord {
            high_score,
            updated_at: Some(Utc::now()),
        };
        Output::open(self.path.clone())?
            .write_json(&record)
            .with_context(|| format!("Failed to save high score to {}", self.path.display()))?;
        self.record = record;
        Ok(())
    }
}

impl HighScoreStore for JsonHighScoreFile {
    fn load(&self) -> usize {
        self.record.high_score
    }

    type Error = anyhow::Error;

    fn save(&mut self, score: usize) -> anyhow::Result<()> {
        self.store(score)
    }
}
