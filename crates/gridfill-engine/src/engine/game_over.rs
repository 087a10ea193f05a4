use crate::core::{Occupancy, has_legal_anchor};

use super::supply::SupplyQueue;

/// Returns `true` if at least one unplaced supply piece fits somewhere.
///
/// Always computed from the current board; nothing is cached between calls.
/// An exhausted queue has no legal move.
pub fn has_legal_move<O>(supply: &SupplyQueue, grid: &O) -> bool
where
    O: Occupancy + ?Sized,
{
    supply
        .pending()
        .any(|(_, piece)| has_legal_anchor(piece.shape, grid))
}
