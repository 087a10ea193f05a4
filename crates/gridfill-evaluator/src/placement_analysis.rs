//! Analysis of board state after a candidate placement.
//!
//! [`PlacementAnalysis`] simulates a placement on a copy of the occupancy mask:
//! it writes the footprint, clears full lines the same way the engine does,
//! and measures the result with [`BoardAnalysis`]. It also records how many of
//! the other pending supply pieces would still fit, which is what decides
//! whether the session survives the current wave.

use arrayvec::ArrayVec;
use gridfill_engine::{BitGrid, LineClear, Position, SUPPLY_SLOTS, ShapeId, has_legal_anchor};

use crate::board_analysis::BoardAnalysis;

#[derive(Debug, Clone)]
pub struct PlacementAnalysis {
    slot: usize,
    shape: ShapeId,
    anchor: Position,
    lines: LineClear,
    board: BitGrid,
    board_analysis: BoardAnalysis,
    remaining_supply: usize,
    stranded_supply: usize,
}

impl PlacementAnalysis {
    /// Simulates placing `shape` at `anchor`.
    ///
    /// `others` are the shapes still waiting in the other supply slots. The
    /// caller is responsible for passing a legal anchor.
    #[must_use]
    pub fn from_board(
        before_placement: &BitGrid,
        slot: usize,
        shape: ShapeId,
        anchor: Position,
        others: &ArrayVec<ShapeId, SUPPLY_SLOTS>,
    ) -> Self {
        let placed = before_placement.with_footprint(shape.offsets(), anchor);
        let lines = LineClear::detect(&placed);
        let mut board = placed;
        for pos in lines.cells() {
            board.vacate(pos);
        }
        let stranded_supply = others
            .iter()
            .filter(|&&other| !has_legal_anchor(other, &board))
            .count();

        Self {
            slot,
            shape,
            anchor,
            lines,
            board,
            board_analysis: BoardAnalysis::from_board(&board),
            remaining_supply: others.len(),
            stranded_supply,
        }
    }

    #[must_use]
    pub fn slot(&self) -> usize {
        self.slot
    }

    #[must_use]
    pub fn shape(&self) -> ShapeId {
        self.shape
    }

    #[must_use]
    pub fn anchor(&self) -> Position {
        self.anchor
    }

    /// Rows and columns this placement would clear.
    #[must_use]
    pub fn lines(&self) -> &LineClear {
        &self.lines
    }

    /// Occupancy after the placement and its line clears.
    #[must_use]
    pub fn board(&self) -> &BitGrid {
        &self.board
    }

    #[must_use]
    pub fn board_analysis(&self) -> &BoardAnalysis {
        &self.board_analysis
    }

    /// Number of other pieces still pending in the wave.
    #[must_use]
    pub fn remaining_supply(&self) -> usize {
        self.remaining_supply
    }

    /// Number of other pending pieces that would no longer fit anywhere.
    #[must_use]
    pub fn stranded_supply(&self) -> usize {
        self.stranded_supply
    }
}
