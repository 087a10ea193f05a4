//! Engine for an 8×8 grid-filling puzzle.
//!
//! Pieces from a three-slot supply are placed on the board; full rows and
//! columns clear and score. See [`engine`] for the game flow.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;
