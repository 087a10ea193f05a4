//! Board metrics used to judge a position.

use gridfill_engine::{BitGrid, COLUMNS, Occupancy as _, Position, ROWS, ShapeId, has_legal_anchor};

/// Offsets of the four orthogonal neighbours of a cell.
const NEIGHBORS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Shapes that can be dealt into any supply slot.
const COMMON_SHAPES: [ShapeId; 10] = [
    ShapeId::O,
    ShapeId::LINE_H4,
    ShapeId::T,
    ShapeId::L,
    ShapeId::J,
    ShapeId::Z,
    ShapeId::S,
    ShapeId::SMALL_L,
    ShapeId::SINGLE,
    ShapeId::PLUS,
];

/// Metrics of a board position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardAnalysis {
    occupied_cells: usize,
    isolated_holes: usize,
    fittable_shapes: usize,
    nearly_full_lines: usize,
}

impl BoardAnalysis {
    #[must_use]
    pub fn from_board(board: &BitGrid) -> Self {
        let isolated_holes = board
            .empty_cells()
            .filter(|&pos| {
                NEIGHBORS
                    .iter()
                    .all(|&(dx, dy)| board.is_occupied(Position::new(pos.x() + dx, pos.y() + dy)))
            })
            .count();
        let fittable_shapes = COMMON_SHAPES
            .iter()
            .filter(|&&shape| has_legal_anchor(shape, board))
            .count();
        let nearly_full_rows = (0..ROWS)
            .filter(|&y| (1..=2).contains(&board.row_bits(y).count_zeros()))
            .count();
        let nearly_full_columns = (0..COLUMNS)
            .filter(|&x| {
                let empty = (0..ROWS)
                    .filter(|&y| board.row_bits(y) & (1 << x) == 0)
                    .count();
                (1..=2).contains(&empty)
            })
            .count();

        Self {
            occupied_cells: board.occupied_count(),
            isolated_holes,
            fittable_shapes,
            nearly_full_lines: nearly_full_rows + nearly_full_columns,
        }
    }

    #[must_use]
    pub fn occupied_cells(&self) -> usize {
        self.occupied_cells
    }

    /// Empty cells with no empty orthogonal neighbour; only the single cell fits there.
    #[must_use]
    pub fn isolated_holes(&self) -> usize {
        self.isolated_holes
    }

    /// How many of the commonly dealt shapes still fit somewhere.
    #[must_use]
    pub fn fittable_shapes(&self) -> usize {
        self.fittable_shapes
    }

    /// Rows and columns missing only one or two cells.
    #[must_use]
    pub fn nearly_full_lines(&self) -> usize {
        self.nearly_full_lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board() {
        let analysis = BoardAnalysis::from_board(&BitGrid::EMPTY);
        assert_eq!(analysis.occupied_cells(), 0);
        assert_eq!(analysis.isolated_holes(), 0);
        assert_eq!(analysis.fittable_shapes(), COMMON_SHAPES.len());
        assert_eq!(analysis.nearly_full_lines(), 0);
    }

    #[test]
    fn test_isolated_holes() {
        let mut board = BitGrid::FULL;
        // Corner hole: bounded by two walls and two occupied cells.
        board.vacate(Position::new(0, 0));
        // Two adjacent holes are not isolated.
        board.vacate(Position::new(4, 4));
        board.vacate(Position::new(5, 4));
        let analysis = BoardAnalysis::from_board(&board);
        assert_eq!(analysis.isolated_holes(), 1);
        assert_eq!(analysis.occupied_cells(), ROWS * COLUMNS - 3);
        // No common shape covers a horizontal pair, so only the single cell fits.
        assert_eq!(analysis.fittable_shapes(), 1);
        // Row 0 and column 0 miss one cell, row 4 misses two, columns 4 and 5 miss one.
        assert_eq!(analysis.nearly_full_lines(), 5);
    }
}
