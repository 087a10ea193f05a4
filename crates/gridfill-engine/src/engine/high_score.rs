use std::convert::Infallible;

/// Persistent storage for the best score ever reached.
///
/// The engine only reads the stored value when a session starts and writes it
/// back when a session ends with a better score. How and where it is kept is up
/// to the implementor.
pub trait HighScoreStore {
    type Error;

    /// Returns the stored high score, or 0 if nothing has been stored yet.
    fn load(&self) -> usize;

    /// Stores `score`. On error the previously stored value is kept.
    fn save(&mut self, score: usize) -> Result<(), Self::Error>;
}

/// A [`HighScoreStore`] that keeps the value in memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryHighScore {
    score: usize,
    saves: usize,
}

impl MemoryHighScore {
    #[must_use]
    pub const fn new(score: usize) -> Self {
        Self { score, saves: 0 }
    }

    /// Number of times [`HighScoreStore::save`] has been called.
    #[must_use]
    pub const fn saves(&self) -> usize {
        self.saves
    }
}

impl HighScoreStore for MemoryHighScore {
    type Error = Infallible;

    fn load(&self) -> usize {
        self.score
    }

    fn save(&mut self, score: usize) -> Result<(), Self::Error> {
        self.score = score;
        self.saves += 1;
        Ok(())
    }
}
