//! Game rules and session management.
//!
//! This module builds the puzzle on top of the [`core`](crate::core) data
//! structures:
//!
//! - [`GameSession`] - Session state machine, placement pipeline and frame clock
//! - [`SupplyGenerator`] / [`SupplyQueue`] - Three-piece waves with biased random selection
//! - [`LineClear`] / [`clear_lines`] - Full row and column detection and removal
//! - [`ScoringRules`] / [`GameStats`] / [`ComboTracker`] - Scoring and statistics
//! - [`has_legal_move`] - Game-over detection
//! - [`HighScoreStore`] - Persistence seam for the best score
//!
//! # Game Flow
//!
//! 1. [`GameSession::start`] empties the board and deals a wave of three pieces
//! 2. The player places pieces from the supply with [`GameSession::try_place`]
//! 3. Every full row and column is cleared and scored after each placement
//! 4. When all three pieces are used a new wave is dealt
//! 5. The session ends when no supply piece fits anywhere on the board
//!
//! # Example
//!
//! ```
//! use gridfill_engine::{GameSession, Position};
//!
//! let mut session = GameSession::new(60);
//! session.start().unwrap();
//!
//! for piece in session.try_spawn_wave().unwrap() {
//!     println!("slot {}: {}", piece.slot, piece.shape);
//! }
//!
//! // Anchors are validated; a rejected placement changes nothing.
//! if session.try_place(0, Position::new(-5, 0)).is_err() {
//!     assert_eq!(session.score(), 0);
//! }
//! ```

pub use self::{
    game_over::*, game_session::*, game_stats::*, high_score::*, line_clear::*, supply::*,
};

mod game_over;
mod game_session;
mod game_stats;
mod high_score;
mod line_clear;
mod supply;
