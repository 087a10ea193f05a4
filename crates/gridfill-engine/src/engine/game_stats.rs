use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{COLUMNS, ROWS};

/// Largest number of lines a single placement can clear.
pub const MAX_LINES_PER_CLEAR: usize = ROWS + COLUMNS;

/// Point values and combo timing.
///
/// Every field has a default, so a JSON override only needs the keys it
/// changes:
///
/// ```
/// use gridfill_engine::ScoringRules;
///
/// let rules: ScoringRules = serde_json::from_str(r#"{ "clear_base_points": 50 }"#).unwrap();
/// assert_eq!(rules.clear_base_points, 50);
/// assert_eq!(rules.placement_points_per_cell, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    pub placement_points_per_cell: usize,
    pub clear_base_points: usize,
    pub combo_window_ms: u64,
    pub combo_multiplier: f64,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            placement_points_per_cell: 10,
            clear_base_points: 100,
            combo_window_ms: 500,
            combo_multiplier: 1.5,
        }
    }
}

impl ScoringRules {
    /// Points awarded for placing a piece with `cells` cells.
    #[must_use]
    pub fn placement_score(&self, cells: usize) -> usize {
        cells * self.placement_points_per_cell
    }

    /// Points awarded for clearing `lines` rows and columns in one placement.
    ///
    /// Quadratic in the line count, so two lines score 4× the base and three
    /// lines score 9×.
    #[must_use]
    pub fn clear_score(&self, lines: usize) -> usize {
        lines * lines * self.clear_base_points
    }

    #[must_use]
    pub fn combo_window(&self) -> Duration {
        Duration::from_millis(self.combo_window_ms)
    }
}

/// Tracks consecutive clears that happen within the combo window.
///
/// The combo count starts at zero with the first clear and grows by one for
/// each following clear that lands less than one window after the previous
/// one. A slower clear resets it to zero.
///
/// The derived [`multiplier`](Self::multiplier) is informational: scores are
/// never scaled by it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComboTracker {
    combo: usize,
    last_clear: Option<Duration>,
}

impl ComboTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            combo: 0,
            last_clear: None,
        }
    }

    #[must_use]
    pub const fn combo(&self) -> usize {
        self.combo
    }

    #[must_use]
    pub const fn last_clear(&self) -> Option<Duration> {
        self.last_clear
    }

    /// Registers a clear at session time `now` and returns the new combo count.
    pub fn record_clear(&mut self, now: Duration, window: Duration) -> usize {
        self.combo = match self.last_clear {
            Some(last) if now.saturating_sub(last) < window => self.combo + 1,
            _ => 0,
        };
        self.last_clear = Some(now);
        self.combo
    }

    /// `1 + combo * (combo_multiplier - 1)`.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn multiplier(&self, rules: &ScoringRules) -> f64 {
        1.0 + self.combo as f64 * (rules.combo_multiplier - 1.0)
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Per-session statistics.
///
/// # Example
///
/// ```
/// use gridfill_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.record_placement(4, 40);
/// stats.record_clear(1, 2, 900);
///
/// assert_eq!(stats.score(), 940);
/// assert_eq!(stats.total_cleared_lines(), 3);
/// assert_eq!(stats.line_clear_counter()[3], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    score: usize,
    placed_pieces: usize,
    placed_cells: usize,
    cleared_rows: usize,
    cleared_columns: usize,
    line_clear_counter: [usize; MAX_LINES_PER_CLEAR + 1],
    waves: usize,
    best_combo: usize,
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            placed_pieces: 0,
            placed_cells: 0,
            cleared_rows: 0,
            cleared_columns: 0,
            line_clear_counter: [0; MAX_LINES_PER_CLEAR + 1],
            waves: 0,
            best_combo: 0,
        }
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub const fn placed_pieces(&self) -> usize {
        self.placed_pieces
    }

    #[must_use]
    pub const fn placed_cells(&self) -> usize {
        self.placed_cells
    }

    #[must_use]
    pub const fn cleared_rows(&self) -> usize {
        self.cleared_rows
    }

    #[must_use]
    pub const fn cleared_columns(&self) -> usize {
        self.cleared_columns
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.cleared_rows + self.cleared_columns
    }

    /// Histogram of placements by number of lines cleared.
    ///
    /// Index `n` counts placements that cleared exactly `n` lines, rows and
    /// columns combined. Index 0 counts placements without a clear.
    #[must_use]
    pub const fn line_clear_counter(&self) -> &[usize; MAX_LINES_PER_CLEAR + 1] {
        &self.line_clear_counter
    }

    /// Number of placements that cleared at least one line.
    #[must_use]
    pub fn clearing_placements(&self) -> usize {
        self.line_clear_counter[1..].iter().sum()
    }

    #[must_use]
    pub const fn waves(&self) -> usize {
        self.waves
    }

    #[must_use]
    pub const fn best_combo(&self) -> usize {
        self.best_combo
    }

    /// Records a placement that did not (yet) clear anything.
    pub const fn record_placement(&mut self, cells: usize, points: usize) {
        self.placed_pieces += 1;
        self.placed_cells += cells;
        self.line_clear_counter[0] += 1;
        self.score += points;
    }

    /// Moves the latest placement from the no-clear bucket to its line count.
    ///
    /// Must follow the [`record_placement`](Self::record_placement) call of the
    /// same placement.
    pub fn record_clear(&mut self, rows: usize, columns: usize, points: usize) {
        let lines = rows + columns;
        if lines == 0 {
            return;
        }
        self.cleared_rows += rows;
        self.cleared_columns += columns;
        self.line_clear_counter[0] = self.line_clear_counter[0].saturating_sub(1);
        self.line_clear_counter[lines.min(MAX_LINES_PER_CLEAR)] += 1;
        self.score += points;
    }

    pub const fn record_wave(&mut self) {
        self.waves += 1;
    }

    pub fn record_combo(&mut self, combo: usize) {
        self.best_combo = self.best_combo.max(combo);
    }
}
