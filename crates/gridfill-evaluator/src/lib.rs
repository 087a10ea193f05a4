//! Automatic play for gridfill sessions.
//!
//! The evaluator works on two levels:
//!
//! 1. **Placement Evaluation** ([`placement_evaluator`]) - Scores one candidate
//!    placement from its [`PlacementAnalysis`](placement_analysis::PlacementAnalysis).
//! 2. **Turn Evaluation** ([`turn_evaluator`]) - Enumerates every (slot, anchor)
//!    candidate of the current supply and picks the highest-scoring one.
//!
//! ```text
//! Turn Evaluation (select best placement)
//!     ↓ uses
//! Placement Evaluation (score single placement)
//!     ↓ uses
//! Placement Analysis / Board Analysis (what the board looks like afterwards)
//! ```
//!
//! # Example
//!
//! ```
//! use gridfill_engine::{GameSession, SupplySeed};
//! use gridfill_evaluator::{placement_evaluator::GreedyEvaluator, turn_evaluator::TurnEvaluator};
//!
//! let mut session = GameSession::with_seed(60, SupplySeed::from_u128(7));
//! session.start().unwrap();
//!
//! let evaluator = TurnEvaluator::new(Box::new(GreedyEvaluator::default()));
//! let turns = evaluator.play_session(&mut session, 50);
//! assert_eq!(session.stats().placed_pieces(), turns);
//! ```

pub mod board_analysis;
pub mod placement_analysis;
pub mod placement_evaluator;
pub mod turn_evaluator;
