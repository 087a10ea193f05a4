use chrono::{DateTime, Utc};
use gridfill_engine::{GameStats, ScoringRules, SupplySeed};
use serde::{Deserialize, Serialize};

/// Results of a `simulate` run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Timestamp when the simulation finished (ISO 8601 format)
    pub generated_at: DateTime<Utc>,
    /// Name of the placement evaluator that played the sessions
    pub evaluator: String,
    pub rules: ScoringRules,
    pub sessions: Vec<SessionRecord>,
}

/// Outcome of one auto-played session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Seed used for supply generation; replaying it reproduces the session
    pub seed: SupplySeed,
    pub turns: usize,
    /// `false` if the session stopped at the turn limit
    pub game_over: bool,
    /// Simulated play time in seconds
    pub play_time: f64,
    pub final_stats: GameStats,
}
