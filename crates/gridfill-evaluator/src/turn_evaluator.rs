//! Turn evaluation: selecting the best placement for the current supply.
//!
//! # How It Works
//!
//! 1. **Enumerate Placements** - Every legal anchor of every pending supply piece
//! 2. **Score Each Placement** - Use the placement evaluator on its analysis
//! 3. **Select Best** - Choose the highest score; ties keep the earliest
//!    candidate (lowest slot, then column-major anchor order)
//!
//! # Design: Greedy One-Step Lookahead
//!
//! Only the immediate placement is scored. Whether the rest of the wave still
//! fits is folded into the analysis through
//! [`stranded_supply`](crate::placement_analysis::PlacementAnalysis::stranded_supply),
//! but no later waves are considered.

use arrayvec::ArrayVec;
use gridfill_engine::{
    GameSession, PlaceError, PlacementOutcome, Position, SUPPLY_SLOTS, ShapeId, legal_anchors,
};

use crate::{placement_analysis::PlacementAnalysis, placement_evaluator::PlacementEvaluator};

/// A placement chosen for the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnPlan {
    slot: usize,
    shape: ShapeId,
    anchor: Position,
}

impl TurnPlan {
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

    /// Places the planned piece in the session.
    pub fn apply(&self, session: &mut GameSession) -> Result<PlacementOutcome, PlaceError> {
        session.try_place(self.slot, self.anchor)
    }
}

/// Evaluates and selects the best placement for the current turn.
#[derive(Debug)]
pub struct TurnEvaluator<'a> {
    placement_evaluator: Box<dyn PlacementEvaluator + 'a>,
}

impl<'a> TurnEvaluator<'a> {
    #[must_use]
    pub fn new(placement_evaluator: Box<dyn PlacementEvaluator + 'a>) -> Self {
        Self {
            placement_evaluator,
        }
    }

    /// Selects the best placement for the session's pending supply.
    ///
    /// Returns `None` if no pending piece fits anywhere.
    #[must_use]
    pub fn select_best_turn(&self, session: &GameSession) -> Option<(TurnPlan, PlacementAnalysis)> {
        let board = session.grid().occupancy();
        let pending = session.supply().pending().collect::<ArrayVec<_, SUPPLY_SLOTS>>();

        let mut best_score = f32::MIN;
        let mut best_result = None;
        for &(slot, piece) in &pending {
            let others = pending
                .iter()
                .filter(|(other, _)| *other != slot)
                .map(|(_, other)| other.shape)
                .collect();
            for anchor in legal_anchors(piece.shape, board) {
                let analysis =
                    PlacementAnalysis::from_board(board, slot, piece.shape, anchor, &others);
                let score = self.placement_evaluator.evaluate_placement(&analysis);
                if best_result.is_none() || score > best_score {
                    best_score = score;
                    let plan = TurnPlan {
                        slot,
                        shape: piece.shape,
                        anchor,
                    };
                    best_result = Some((plan, analysis));
                }
            }
        }

        best_result
    }

    /// Plays `session` until it is over or `turn_limit` placements were made.
    ///
    /// The session must already be playing. Returns the number of placements.
    pub fn play_session(&self, session: &mut GameSession, turn_limit: usize) -> usize {
        let mut turns = 0;
        while turns < turn_limit && session.session_state().is_playing() {
            let Some((turn, _analysis)) = self.select_best_turn(session) else {
                break;
            };
            if turn.apply(session).is_err() {
                break;
            }
            turns += 1;
        }
        turns
    }
}
