use super::{
    grid::{Occupancy, Position},
    shape::{Offset, ShapeId},
};

/// Returns `true` if a shape with the given offsets fits at `anchor`.
///
/// The anchor itself must be on the board, and every footprint cell must be
/// on the board and empty. Checking stops at the first failing cell.
///
/// # Example
///
/// ```
/// use gridfill_engine::{GridState, Position, ShapeId, can_place};
///
/// let grid = GridState::new();
/// assert!(can_place(ShapeId::O.offsets(), Position::new(0, 0), &grid));
/// assert!(!can_place(ShapeId::O.offsets(), Position::new(7, 7), &grid));
/// ```
pub fn can_place<O>(offsets: &[Offset], anchor: Position, grid: &O) -> bool
where
    O: Occupancy + ?Sized,
{
    anchor.is_in_bounds()
        && offsets
            .iter()
            .all(|&offset| {
                anchor
                    .offset_by(offset)
                    .is_some_and(|cell| !grid.is_occupied(cell))
            })
}

/// Convenience wrapper of [`can_place`] for catalog shapes.
pub fn can_place_shape<O>(shape: ShapeId, anchor: Position, grid: &O) -> bool
where
    O: Occupancy + ?Sized,
{
    can_place(shape.offsets(), anchor, grid)
}

/// Enumerates every anchor where `shape` fits, column by column.
pub fn legal_anchors<O>(shape: ShapeId, grid: &O) -> impl Iterator<Item = Position> + '_
where
    O: Occupancy + ?Sized,
{
    Position::all().filter(move |&anchor| can_place_shape(shape, anchor, grid))
}

/// Returns `true` if `shape` fits somewhere on the board.
pub fn has_legal_anchor<O>(shape: ShapeId, grid: &O) -> bool
where
    O: Occupancy + ?Sized,
{
    legal_anchors(shape, grid).next().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BitGrid, COLUMNS, GridState, PieceId, ROWS};

    #[test]
    fn test_anchor_must_be_in_bounds() {
        let grid = GridState::new();
        // A shape whose cells would all land on the board from an off-board anchor.
        let offsets = [Offset::new(1, 0)];
        assert!(can_place(&offsets, Position::new(0, 0), &grid));
        assert!(!can_place(&offsets, Position::new(-1, 0), &grid));
    }

    #[test]
    fn test_line_h4_edges() {
        let grid = GridState::new();
        let line = ShapeId::LINE_H4;
        // Offsets span dx -1..=2.
        assert!(!can_place_shape(line, Position::new(0, 0), &grid));
        assert!(can_place_shape(line, Position::new(1, 0), &grid));
        assert!(can_place_shape(line, Position::new(5, 7), &grid));
        assert!(!can_place_shape(line, Position::new(6, 0), &grid));
    }

    #[test]
    fn test_occupied_cell_blocks_placement() {
        let mut grid = GridState::new();
        grid.place(PieceId(0), ShapeId::SINGLE, Position::new(3, 3))
            .unwrap();
        assert!(!can_place_shape(ShapeId::PLUS, Position::new(3, 3), &grid));
        assert!(!can_place_shape(ShapeId::PLUS, Position::new(3, 4), &grid));
        assert!(can_place_shape(ShapeId::PLUS, Position::new(5, 5), &grid));
    }

    #[test]
    fn test_legal_anchor_counts_on_empty_board() {
        let grid = BitGrid::EMPTY;
        assert_eq!(legal_anchors(ShapeId::SINGLE, &grid).count(), COLUMNS * ROWS);
        assert_eq!(legal_anchors(ShapeId::O, &grid).count(), 7 * 7);
        assert_eq!(legal_anchors(ShapeId::BLOCK_3X3, &grid).count(), 6 * 6);
        assert_eq!(legal_anchors(ShapeId::LINE_H4, &grid).count(), 5 * 8);
    }

    #[test]
    fn test_legal_anchors_are_column_major() {
        let anchors = legal_anchors(ShapeId::SINGLE, &BitGrid::EMPTY)
            .take(3)
            .collect::<Vec<_>>();
        assert_eq!(
            anchors,
            [Position::new(0, 0), Position::new(0, 1), Position::new(0, 2)]
        );
    }

    #[test]
    fn test_full_board_has_no_anchor() {
        for shape in ShapeId::all() {
            assert!(!has_legal_anchor(shape, &BitGrid::FULL), "{shape}");
            assert!(has_legal_anchor(shape, &BitGrid::EMPTY), "{shape}");
        }
    }
}
