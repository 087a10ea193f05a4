//! Placement evaluation: scoring individual candidate placements.
//!
//! Two evaluators are provided:
//!
//! - [`GreedyEvaluator`] - Weighted sum of board metrics after the placement.
//!   Rewards clears and near-complete lines, and penalizes isolated holes,
//!   lost options and stranded supply pieces.
//! - [`RandomPlacementEvaluator`] - Seeded pseudo-random scores, as a baseline.
//!
//! # Usage
//!
//! ```
//! use arrayvec::ArrayVec;
//! use gridfill_engine::{BitGrid, Position, ShapeId};
//! use gridfill_evaluator::{
//!     placement_analysis::PlacementAnalysis,
//!     placement_evaluator::{GreedyEvaluator, PlacementEvaluator},
//! };
//!
//! let analysis = PlacementAnalysis::from_board(
//!     &BitGrid::EMPTY,
//!     0,
//!     ShapeId::O,
//!     Position::new(0, 0),
//!     &ArrayVec::new(),
//! );
//! let score = GreedyEvaluator::default().evaluate_placement(&analysis);
//! assert!(score.is_finite());
//! ```

use std::{
    fmt,
    hash::{DefaultHasher, Hash as _, Hasher as _},
};

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::placement_analysis::PlacementAnalysis;

/// Evaluates piece placements by assigning scores.
pub trait PlacementEvaluator: fmt::Debug + Send + Sync {
    /// Evaluates a placement and returns a score (higher is better).
    fn evaluate_placement(&self, analysis: &PlacementAnalysis) -> f32;
}

/// Weights of the [`GreedyEvaluator`] terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GreedyWeights {
    /// Applied to the squared number of cleared lines, mirroring clear scoring.
    pub cleared_lines: f32,
    pub occupied_cells: f32,
    pub isolated_holes: f32,
    pub fittable_shapes: f32,
    pub nearly_full_lines: f32,
    pub stranded_supply: f32,
}

impl Default for GreedyWeights {
    fn default() -> Self {
        Self {
            cleared_lines: 10.0,
            occupied_cells: -0.1,
            isolated_holes: -3.0,
            fittable_shapes: 1.0,
            nearly_full_lines: 0.5,
            stranded_supply: -50.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GreedyEvaluator {
    weights: GreedyWeights,
}

impl GreedyEvaluator {
    #[must_use]
    pub fn new(weights: GreedyWeights) -> Self {
        Self { weights }
    }

    #[must_use]
    pub fn weights(&self) -> &GreedyWeights {
        &self.weights
    }
}

impl PlacementEvaluator for GreedyEvaluator {
    #[expect(clippy::cast_precision_loss)]
    fn evaluate_placement(&self, analysis: &PlacementAnalysis) -> f32 {
        let w = &self.weights;
        let board = analysis.board_analysis();
        let lines = analysis.lines().line_count() as f32;

        w.cleared_lines * lines * lines
            + w.occupied_cells * board.occupied_cells() as f32
            + w.isolated_holes * board.isolated_holes() as f32
            + w.fittable_shapes * board.fittable_shapes() as f32
            + w.nearly_full_lines * board.nearly_full_lines() as f32
            + w.stranded_supply * analysis.stranded_supply() as f32
    }
}

/// Scores every placement with a pseudo-random value in `[0, 1)`.
///
/// The value is derived from the seed and the placement itself, so the same
/// candidate on the same board always gets the same score.
#[derive(Debug, Clone, Copy)]
pub struct RandomPlacementEvaluator {
    seed: u64,
}

impl RandomPlacementEvaluator {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl PlacementEvaluator for RandomPlacementEvaluator {
    fn evaluate_placement(&self, analysis: &PlacementAnalysis) -> f32 {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        analysis.slot().hash(&mut hasher);
        analysis.shape().hash(&mut hasher);
        analysis.anchor().hash(&mut hasher);
        analysis.board().hash(&mut hasher);
        Pcg32::seed_from_u64(hasher.finish()).random()
    }
}

#[cfg(test)]
mod tests {
    use arrayvec::ArrayVec;
    use gridfill_engine::{BitGrid, Position, ShapeId};

    use super::*;

    fn analyze(board: &BitGrid, shape: ShapeId, anchor: Position) -> PlacementAnalysis {
        PlacementAnalysis::from_board(board, 0, shape, anchor, &ArrayVec::new())
    }

    #[test]
    fn test_greedy_prefers_clear() {
        let mut board = BitGrid::EMPTY;
        for x in 0..7 {
            board.occupy(Position::new(x, 3));
        }
        let evaluator = GreedyEvaluator::default();
        let clearing =
            evaluator.evaluate_placement(&analyze(&board, ShapeId::SINGLE, Position::new(7, 3)));
        let elsewhere =
            evaluator.evaluate_placement(&analyze(&board, ShapeId::SINGLE, Position::new(7, 7)));
        assert!(clearing > elsewhere, "{clearing} <= {elsewhere}");
    }

    #[test]
    fn test_greedy_avoids_stranding_supply() {
        let mut board = BitGrid::FULL;
        // A vertical gap in column 0, plus one more hole per row so nothing clears.
        for (x, y) in [(0, 0), (0, 1), (0, 2), (3, 0), (5, 1), (3, 2)] {
            board.vacate(Position::new(x, y));
        }
        let others = ArrayVec::from_iter([ShapeId::LINE_V2]);
        let evaluator = GreedyEvaluator::default();

        // Filling the middle of the gap leaves no room for the I2.
        let analyze_at = |anchor| {
            PlacementAnalysis::from_board(&board, 0, ShapeId::SINGLE, anchor, &others)
        };
        let strands = analyze_at(Position::new(0, 1));
        let keeps = analyze_at(Position::new(3, 0));
        assert!(strands.lines().is_empty());
        assert!(keeps.lines().is_empty());
        assert_eq!(strands.stranded_supply(), 1);
        assert_eq!(keeps.stranded_supply(), 0);
        assert!(evaluator.evaluate_placement(&keeps) > evaluator.evaluate_placement(&strands));
    }

    #[test]
    fn test_weights_from_json() {
        let weights: GreedyWeights =
            serde_json::from_str(r#"{ "isolated_holes": -10.0 }"#).unwrap();
        let defaults = GreedyWeights::default();
        assert!((weights.isolated_holes + 10.0).abs() < f32::EPSILON);
        assert!((weights.cleared_lines - defaults.cleared_lines).abs() < f32::EPSILON);
    }

    #[test]
    fn test_random_is_deterministic() {
        let analysis = analyze(&BitGrid::EMPTY, ShapeId::T, Position::new(3, 3));
        let a = RandomPlacementEvaluator::new(1);
        let b = RandomPlacementEvaluator::new(1);
        let score = a.evaluate_placement(&analysis);
        assert!((0.0..1.0).contains(&score));
        assert!((score - b.evaluate_placement(&analysis)).abs() < f32::EPSILON);

        let other = analyze(&BitGrid::EMPTY, ShapeId::T, Position::new(4, 3));
        let scores = (0..16)
            .map(|seed| RandomPlacementEvaluator::new(seed).evaluate_placement(&other))
            .collect::<Vec<_>>();
        assert!(scores.iter().any(|s| (s - scores[0]).abs() > f32::EPSILON));
    }
}
