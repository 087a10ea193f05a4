use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Contents of the high score file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreRecord {
    pub high_score: usize,
    /// When the high score was last written (RFC 3339); absent if never set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}
