pub mod catalog;
pub mod high_score;
pub mod simulation;
