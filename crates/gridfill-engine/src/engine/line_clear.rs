use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::core::{BitGrid, COLUMNS, GridState, Offset, Position, ROWS};

/// Full rows and columns detected on a board.
///
/// Row and column indices are ascending. An intersection cell belongs to both
/// a cleared row and a cleared column and is reported through both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineClear {
    rows: ArrayVec<u8, ROWS>,
    columns: ArrayVec<u8, COLUMNS>,
}

impl LineClear {
    /// Scans the occupancy mask for full rows and full columns.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub fn detect(grid: &BitGrid) -> Self {
        Self {
            rows: grid.full_rows().map(|y| y as u8).collect(),
            columns: grid.full_columns().map(|x| x as u8).collect(),
        }
    }

    /// Predicts the lines that would clear if a shape with `offsets` were placed
    /// at `anchor`.
    ///
    /// Works on a copy of the occupancy mask, so repeated calls are
    /// side-effect free. Footprint cells outside the board are ignored and no
    /// fit check is made; callers usually check
    /// [`can_place`](crate::core::can_place) first.
    #[must_use]
    pub fn preview(grid: &BitGrid, offsets: &[Offset], anchor: Position) -> Self {
        Self::detect(&grid.with_footprint(offsets, anchor))
    }

    #[must_use]
    pub fn rows(&self) -> &[u8] {
        &self.rows
    }

    #[must_use]
    pub fn columns(&self) -> &[u8] {
        &self.columns
    }

    #[must_use]
    pub fn rows_cleared(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn columns_cleared(&self) -> usize {
        self.columns.len()
    }

    /// Total number of lines, counting rows and columns separately.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rows.len() + self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.columns.is_empty()
    }

    /// Every cell on a cleared line, each listed once.
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        let row_cells = self.rows.iter().flat_map(|&y| {
            (0..COLUMNS).map(move |x| Position::from_index(x, usize::from(y)))
        });
        let column_cells = self.columns.iter().flat_map(move |&x| {
            (0..ROWS)
                .filter(move |y| !self.rows.iter().any(|row| usize::from(*row) == *y))
                .map(move |y| Position::from_index(usize::from(x), y))
        });
        row_cells.chain(column_cells)
    }
}

/// Outcome of [`clear_lines`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearedCells {
    pub lines: LineClear,
    /// Number of cells emptied.
    pub cells_removed: usize,
    /// Number of placed pieces that lost their last cell.
    pub pieces_destroyed: usize,
}

/// Detects every full row and column and removes their cells.
///
/// Detection finishes before any removal, so a cell shared by a full row and a
/// full column is removed once. Remaining cells keep their positions.
pub fn clear_lines(grid: &mut GridState) -> ClearedCells {
    let lines = LineClear::detect(grid.occupancy());
    if lines.is_empty() {
        return ClearedCells::default();
    }

    let mut cells_removed = 0;
    let mut pieces_destroyed = 0;
    for pos in lines.cells() {
        if let Some(removed) = grid.remove_cell(pos) {
            cells_removed += 1;
            if removed.piece_destroyed {
                pieces_destroyed += 1;
            }
        }
    }

    ClearedCells {
        lines,
        cells_removed,
        pieces_destroyed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Occupancy as _, PieceId, ShapeId, grid::tests::assert_consistent};

    fn fill_row(grid: &mut GridState, next_id: &mut u32, y: i32) {
        for x in Position::X_RANGE {
            if !grid.is_occupied(Position::new(x, y)) {
                grid.place(PieceId(*next_id), ShapeId::SINGLE, Position::new(x, y))
                    .unwrap();
                *next_id += 1;
            }
        }
    }

    fn fill_column(grid: &mut GridState, next_id: &mut u32, x: i32) {
        for y in Position::Y_RANGE {
            if !grid.is_occupied(Position::new(x, y)) {
                grid.place(PieceId(*next_id), ShapeId::SINGLE, Position::new(x, y))
                    .unwrap();
                *next_id += 1;
            }
        }
    }

    #[test]
    fn test_no_full_lines_leaves_grid_unchanged() {
        let mut grid = GridState::new();
        grid.place(PieceId(0), ShapeId::BLOCK_3X3, Position::new(1, 1))
            .unwrap();
        let before = grid.clone();
        let cleared = clear_lines(&mut grid);
        assert!(cleared.lines.is_empty());
        assert_eq!(cleared.cells_removed, 0);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_single_row_clear() {
        let mut grid = GridState::new();
        let mut id = 0;
        fill_row(&mut grid, &mut id, 3);
        grid.place(PieceId(100), ShapeId::SINGLE, Position::new(0, 0))
            .unwrap();

        let cleared = clear_lines(&mut grid);
        assert_eq!(cleared.lines.rows(), [3]);
        assert!(cleared.lines.columns().is_empty());
        assert_eq!(cleared.cells_removed, COLUMNS);
        assert_eq!(cleared.pieces_destroyed, COLUMNS);
        assert_eq!(grid.occupied_count(), 1);
        assert!(grid.is_occupied(Position::new(0, 0)));
        assert_consistent(&grid);
    }

    #[test]
    fn test_intersections_removed_once() {
        let mut grid = GridState::new();
        let mut id = 0;
        fill_row(&mut grid, &mut id, 0);
        fill_row(&mut grid, &mut id, 1);
        fill_column(&mut grid, &mut id, 4);
        assert_eq!(grid.occupied_count(), 2 * COLUMNS + ROWS - 2);

        let cleared = clear_lines(&mut grid);
        assert_eq!(cleared.lines.rows(), [0, 1]);
        assert_eq!(cleared.lines.columns(), [4]);
        assert_eq!(cleared.lines.line_count(), 3);
        assert_eq!(cleared.cells_removed, 2 * COLUMNS + ROWS - 2);
        assert_eq!(grid.occupied_count(), 0);
        assert_consistent(&grid);
    }

    #[test]
    fn test_partial_piece_survives_clear() {
        let mut grid = GridState::new();
        // Vertical I2 at x=0 spanning rows 0 and 1; only row 0 is completed.
        grid.place(PieceId(0), ShapeId::LINE_V2, Position::new(0, 0))
            .unwrap();
        let mut id = 1;
        fill_row(&mut grid, &mut id, 0);

        let cleared = clear_lines(&mut grid);
        assert_eq!(cleared.lines.rows(), [0]);
        assert_eq!(cleared.pieces_destroyed, COLUMNS - 1);
        let survivor = grid.piece(PieceId(0)).unwrap();
        assert_eq!(survivor.remaining_cells(), 1);
        assert_eq!(grid.owner_at(Position::new(0, 1)), Some(PieceId(0)));
        assert_consistent(&grid);
    }

    #[test]
    fn test_preview_is_side_effect_free() {
        let mut grid = GridState::new();
        for x in 0_i32..6 {
            grid.place(PieceId(x.cast_unsigned()), ShapeId::SINGLE, Position::new(x, 2))
                .unwrap();
        }
        let before = grid.clone();

        let board = grid.occupancy();
        let first = LineClear::preview(board, ShapeId::LINE_V2.offsets(), Position::new(6, 1));
        assert!(first.is_empty());

        let hit = LineClear::preview(board, ShapeId::LINE_H4.offsets(), Position::new(5, 2));
        let again = LineClear::preview(board, ShapeId::LINE_H4.offsets(), Position::new(5, 2));
        assert_eq!(hit.rows(), [2]);
        assert_eq!(hit, again);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_preview_ignores_off_board_offsets() {
        let mut bits = BitGrid::EMPTY;
        for x in 0..COLUMNS - 2 {
            bits.occupy(Position::from_index(x, 0));
        }
        // I4 anchored at (7, 0) covers x = 6..=9; x = 8 and 9 are dropped.
        let preview = LineClear::preview(&bits, ShapeId::LINE_H4.offsets(), Position::new(7, 0));
        assert_eq!(preview.rows(), [0]);
    }
}
