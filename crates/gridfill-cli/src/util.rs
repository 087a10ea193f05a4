use std::{
    fmt,
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use gridfill_engine::ScoringRules;
use gridfill_evaluator::placement_evaluator::GreedyWeights;

/// Destination for JSON reports: a file if a path was given, stdout otherwise.
#[derive(Debug)]
pub enum Output {
    Stdout(io::StdoutLock<'static>),
    File { path: PathBuf, writer: BufWriter<File> },
}

impl Output {
    /// Writes `value` as pretty JSON to `path`, or to stdout if `path` is `None`.
    pub fn save_json<T>(value: &T, path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize + ?Sized,
    {
        let mut output = match path {
            Some(path) => Self::open(path)?,
            None => Self::Stdout(io::stdout().lock()),
        };
        output.write_json(value)
    }

    /// Creates `path` for writing, along with any missing parent directories.
    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Self::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize + ?Sized,
    {
        let result = serde_json::to_writer_pretty(&mut *self, value)
            .map_err(io::Error::from)
            .and_then(|()| writeln!(self))
            .and_then(|()| self.flush());
        result.with_context(|| format!("Failed to write JSON to {self}"))
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout(_) => f.write_str("stdout"),
            Self::File { path, .. } => write!(f, "{}", path.display()),
        }
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(writer) => writer.write(buf),
            Self::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(writer) => writer.flush(),
            Self::File { writer, .. } => writer.flush(),
        }
    }
}

/// Parses a JSON file; `file_kind` names the file in error messages.
pub fn read_json_file<T>(file_kind: &str, path: &Path) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let file = File::open(path)
        .with_context(|| format!("Failed to open {file_kind} file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {file_kind} JSON file: {}", path.display()))
}

/// Scoring rule overrides, or the defaults if no path is given.
pub fn read_rules_file(path: Option<&Path>) -> anyhow::Result<ScoringRules> {
    match path {
        Some(path) => read_json_file("scoring rules", path),
        None => Ok(ScoringRules::default()),
    }
}

/// Greedy evaluator weights, or the defaults if no path is given.
pub fn read_weights_file(path: Option<&Path>) -> anyhow::Result<GreedyWeights> {
    match path {
        Some(path) => read_json_file("evaluator weights", path),
        None => Ok(GreedyWeights::default()),
    }
}
