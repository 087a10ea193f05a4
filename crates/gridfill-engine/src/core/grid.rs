use std::{collections::BTreeMap, fmt, ops::Range};

use serde::{Deserialize, Serialize};

use super::{
    COLUMNS, ROWS,
    shape::{Offset, ShapeId},
};

/// Absolute cell coordinate on the board.
///
/// (0, 0) is the bottom-left cell; `x` grows rightward (columns) and `y` grows
/// upward (rows). Coordinates may lie outside the board: they are only ever
/// rejected at the boundary, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    pub const X_RANGE: Range<i32> = 0..COLUMNS as i32;
    pub const Y_RANGE: Range<i32> = 0..ROWS as i32;

    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn x(self) -> i32 {
        self.x
    }

    #[must_use]
    pub const fn y(self) -> i32 {
        self.y
    }

    /// The absolute cell covered by `offset` when a shape is anchored here.
    ///
    /// Returns `None` if the coordinate does not fit in an `i32`; such a cell
    /// is off the board.
    #[must_use]
    pub const fn offset_by(self, offset: Offset) -> Option<Self> {
        match (
            self.x.checked_add(offset.dx() as i32),
            self.y.checked_add(offset.dy() as i32),
        ) {
            (Some(x), Some(y)) => Some(Self { x, y }),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_in_bounds(self) -> bool {
        self.x >= 0 && self.x < COLUMNS as i32 && self.y >= 0 && self.y < ROWS as i32
    }

    /// Returns `(column, row)` indices if the position is on the board.
    #[must_use]
    #[expect(clippy::cast_sign_loss)]
    pub const fn cell_index(self) -> Option<(usize, usize)> {
        if self.is_in_bounds() {
            Some((self.x as usize, self.y as usize))
        } else {
            None
        }
    }

    /// Iterates over every on-board position, column by column.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::X_RANGE.flat_map(|x| Self::Y_RANGE.map(move |y| Self::new(x, y)))
    }

    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub(crate) const fn from_index(x: usize, y: usize) -> Self {
        Self::new(x as i32, y as i32)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Identifier of a piece instance, unique within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(pub u32);

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read access to cell occupancy.
///
/// Coordinates outside the board report as occupied, so boundary checks compose
/// with occupancy checks.
pub trait Occupancy {
    fn is_occupied(&self, pos: Position) -> bool;
}

const FULL_ROW: u8 = u8::MAX;
const _: () = assert!(COLUMNS == 8, "BitGrid packs one row into a u8");

/// Occupancy-only bitmask of the board.
///
/// Each row is a `u8` where bit `x` is set when column `x` is occupied. The
/// type is `Copy`, which makes it the working copy for previews and for
/// evaluating hypothetical placements without touching the authoritative
/// [`GridState`].
///
/// Serialized as comma-separated hex rows from `y = 0` upward, e.g.
/// `"ff,00,00,00,00,00,00,81"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BitGrid {
    rows: [u8; ROWS],
}

impl Serialize for BitGrid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let rows = self
            .rows
            .iter()
            .map(|row| format!("{row:02x}"))
            .collect::<Vec<_>>();
        serializer.serialize_str(&rows.join(","))
    }
}

impl<'de> Deserialize<'de> for BitGrid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let parts = s.split(',').collect::<Vec<_>>();
        if parts.len() != ROWS {
            return Err(serde::de::Error::custom(format!(
                "expected {ROWS} comma-separated hex rows, got {}",
                parts.len()
            )));
        }
        let mut rows = [0; ROWS];
        for (y, hex) in parts.iter().enumerate() {
            rows[y] = u8::from_str_radix(hex, 16).map_err(|e| {
                serde::de::Error::custom(format!("invalid hex at row {y}: {hex} ({e})"))
            })?;
        }
        Ok(Self { rows })
    }
}

impl BitGrid {
    pub const EMPTY: Self = Self { rows: [0; ROWS] };
    pub const FULL: Self = Self {
        rows: [FULL_ROW; ROWS],
    };

    /// Marks the cell as occupied. Off-board positions are ignored.
    pub fn occupy(&mut self, pos: Position) {
        if let Some((x, y)) = pos.cell_index() {
            self.rows[y] |= 1 << x;
        }
    }

    /// Marks the cell as empty. Off-board positions are ignored.
    pub fn vacate(&mut self, pos: Position) {
        if let Some((x, y)) = pos.cell_index() {
            self.rows[y] &= !(1 << x);
        }
    }

    /// Returns a copy with every on-board cell of the footprint occupied.
    ///
    /// Cells of the footprint that fall outside the board are ignored.
    #[must_use]
    pub fn with_footprint(mut self, offsets: &[Offset], anchor: Position) -> Self {
        for pos in offsets.iter().filter_map(|&offset| anchor.offset_by(offset)) {
            self.occupy(pos);
        }
        self
    }

    #[must_use]
    pub fn row_bits(&self, y: usize) -> u8 {
        self.rows[y]
    }

    #[must_use]
    pub fn is_row_full(&self, y: usize) -> bool {
        self.rows[y] == FULL_ROW
    }

    #[must_use]
    pub fn is_column_full(&self, x: usize) -> bool {
        let bit = 1 << x;
        self.rows.iter().all(|row| row & bit != 0)
    }

    pub fn full_rows(&self) -> impl Iterator<Item = usize> + '_ {
        (0..ROWS).filter(|&y| self.is_row_full(y))
    }

    pub fn full_columns(&self) -> impl Iterator<Item = usize> + '_ {
        (0..COLUMNS).filter(|&x| self.is_column_full(x))
    }

    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.rows.iter().map(|row| row.count_ones() as usize).sum()
    }

    pub fn empty_cells(&self) -> impl Iterator<Item = Position> + '_ {
        Position::all().filter(|&pos| !self.is_occupied(pos))
    }
}

impl Occupancy for BitGrid {
    #[inline]
    fn is_occupied(&self, pos: Position) -> bool {
        match pos.cell_index() {
            Some((x, y)) => self.rows[y] & (1 << x) != 0,
            None => true,
        }
    }
}

/// Renders the board top row first, `#` for occupied and `.` for empty.
impl fmt::Display for BitGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..ROWS).rev() {
            for x in 0..COLUMNS {
                let c = if self.rows[y] & (1 << x) != 0 { '#' } else { '.' };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PlacementError {
    #[display("cell {position} is outside the grid")]
    OutOfBounds { position: Position },
    #[display("cell {position} is already occupied by piece {owner}")]
    Occupied { position: Position, owner: PieceId },
    #[display("piece {id} is already on the grid")]
    DuplicatePiece { id: PieceId },
}

/// A piece that has been placed and still owns at least one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedPiece {
    shape: ShapeId,
    anchor: Position,
    remaining_cells: usize,
}

impl PlacedPiece {
    #[must_use]
    pub fn shape(&self) -> ShapeId {
        self.shape
    }

    #[must_use]
    pub fn anchor(&self) -> Position {
        self.anchor
    }

    #[must_use]
    pub fn remaining_cells(&self) -> usize {
        self.remaining_cells
    }

    /// Absolute cells of the original footprint, including ones already cleared.
    pub fn footprint(&self) -> impl Iterator<Item = Position> + '_ {
        self.shape
            .offsets()
            .iter()
            .filter_map(|&offset| self.anchor.offset_by(offset))
    }
}

/// Result of removing a single occupied cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovedCell {
    pub owner: PieceId,
    /// `true` when this was the owner's last remaining cell.
    pub piece_destroyed: bool,
}

/// Authoritative board state: which piece owns each cell.
///
/// Keeps three views in sync:
///
/// - per-cell ownership (`cells`)
/// - an occupancy [`BitGrid`] for fast full-line and fit checks
/// - the set of live [`PlacedPiece`]s with their remaining cell counts
///
/// # Invariant
///
/// The occupied cells are exactly the union of the live pieces' remaining
/// cells, no two pieces share a cell, and nothing outside the board is stored.
///
/// # Example
///
/// ```
/// use gridfill_engine::{GridState, Occupancy, PieceId, Position, ShapeId};
///
/// let mut grid = GridState::new();
/// grid.place(PieceId(0), ShapeId::O, Position::new(0, 0)).unwrap();
/// assert!(grid.is_occupied(Position::new(1, 1)));
/// assert!(grid.is_occupied(Position::new(-1, 0)));
///
/// let removed = grid.remove_cell(Position::new(0, 0)).unwrap();
/// assert!(!removed.piece_destroyed);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridState {
    cells: [[Option<PieceId>; COLUMNS]; ROWS],
    occupancy: BitGrid,
    pieces: BTreeMap<PieceId, PlacedPiece>,
}

impl Default for GridState {
    fn default() -> Self {
        Self::new()
    }
}

impl GridState {
    pub const COLUMNS: usize = COLUMNS;
    pub const ROWS: usize = ROWS;

    #[must_use]
    pub fn new() -> Self {
        Self {
            cells: [[None; COLUMNS]; ROWS],
            occupancy: BitGrid::EMPTY,
            pieces: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn occupancy(&self) -> &BitGrid {
        &self.occupancy
    }

    #[must_use]
    pub fn owner_at(&self, pos: Position) -> Option<PieceId> {
        let (x, y) = pos.cell_index()?;
        self.cells[y][x]
    }

    #[must_use]
    pub fn piece(&self, id: PieceId) -> Option<&PlacedPiece> {
        self.pieces.get(&id)
    }

    /// Iterates over pieces that still own at least one cell.
    pub fn placed_pieces(&self) -> impl Iterator<Item = (PieceId, &PlacedPiece)> + '_ {
        self.pieces.iter().map(|(id, piece)| (*id, piece))
    }

    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.occupancy.occupied_count()
    }

    /// Writes ownership of every footprint cell.
    ///
    /// Callers are expected to validate with
    /// [`can_place`](super::placement::can_place) first. An invalid request is
    /// rejected and leaves the grid unchanged.
    pub fn place(
        &mut self,
        id: PieceId,
        shape: ShapeId,
        anchor: Position,
    ) -> Result<(), PlacementError> {
        if self.pieces.contains_key(&id) {
            return Err(PlacementError::DuplicatePiece { id });
        }
        for &offset in shape.offsets() {
            // An overflowing coordinate is reported at the anchor.
            let position = anchor.offset_by(offset).unwrap_or(anchor);
            if !position.is_in_bounds() {
                return Err(PlacementError::OutOfBounds { position });
            }
            if let Some(owner) = self.owner_at(position) {
                return Err(PlacementError::Occupied { position, owner });
            }
        }

        for position in shape.offsets().iter().filter_map(|&o| anchor.offset_by(o)) {
            if let Some((x, y)) = position.cell_index() {
                self.cells[y][x] = Some(id);
                self.occupancy.occupy(position);
            }
        }
        self.pieces.insert(
            id,
            PlacedPiece {
                shape,
                anchor,
                remaining_cells: shape.cell_count(),
            },
        );
        Ok(())
    }

    /// Clears a single cell regardless of which piece owns it.
    ///
    /// Returns `None` if the cell was empty or off the board. When the owner
    /// loses its last cell it is dropped from the live piece set.
    pub fn remove_cell(&mut self, pos: Position) -> Option<RemovedCell> {
        let (x, y) = pos.cell_index()?;
        let owner = self.cells[y][x].take()?;
        self.occupancy.vacate(pos);

        let mut piece_destroyed = false;
        if let Some(piece) = self.pieces.get_mut(&owner) {
            piece.remaining_cells = piece.remaining_cells.saturating_sub(1);
            if piece.remaining_cells == 0 {
                self.pieces.remove(&owner);
                piece_destroyed = true;
            }
        }
        Some(RemovedCell {
            owner,
            piece_destroyed,
        })
    }

    /// Empties the whole board.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Occupancy for GridState {
    #[inline]
    fn is_occupied(&self, pos: Position) -> bool {
        self.occupancy.is_occupied(pos)
    }
}

impl fmt::Display for GridState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.occupancy, f)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;

    use super::*;

    /// Checks that ownership, occupancy and live pieces agree with each other.
    pub(crate) fn assert_consistent(grid: &GridState) {
        let mut owned = HashMap::<PieceId, usize>::new();
        for pos in Position::all() {
            let owner = grid.owner_at(pos);
            assert_eq!(
                owner.is_some(),
                grid.occupancy().is_occupied(pos),
                "ownership and occupancy disagree at {pos}"
            );
            if let Some(id) = owner {
                *owned.entry(id).or_default() += 1;
                let piece = grid.piece(id).expect("owner should be a live piece");
                assert!(
                    piece.footprint().any(|cell| cell == pos),
                    "{pos} is not in the footprint of piece {id}"
                );
            }
        }
        assert_eq!(owned.len(), grid.placed_pieces().count());
        for (id, piece) in grid.placed_pieces() {
            assert_eq!(owned.get(&id).copied(), Some(piece.remaining_cells()));
        }
    }

    #[test]
    fn test_out_of_bounds_is_occupied() {
        let grid = GridState::new();
        assert!(!grid.is_occupied(Position::new(0, 0)));
        assert!(!grid.is_occupied(Position::new(7, 7)));
        assert!(grid.is_occupied(Position::new(-1, 0)));
        assert!(grid.is_occupied(Position::new(0, -1)));
        assert!(grid.is_occupied(Position::new(8, 0)));
        assert!(grid.is_occupied(Position::new(0, 8)));
    }

    #[test]
    fn test_place_writes_ownership() {
        let mut grid = GridState::new();
        grid.place(PieceId(1), ShapeId::LINE_H4, Position::new(3, 0))
            .unwrap();

        for x in 2..=5 {
            assert_eq!(grid.owner_at(Position::new(x, 0)), Some(PieceId(1)));
        }
        assert_eq!(grid.owner_at(Position::new(1, 0)), None);
        assert_eq!(grid.owner_at(Position::new(6, 0)), None);
        assert_eq!(grid.occupied_count(), 4);
        assert_consistent(&grid);
    }

    #[test]
    fn test_place_rejects_overlap_without_mutation() {
        let mut grid = GridState::new();
        grid.place(PieceId(1), ShapeId::O, Position::new(0, 0))
            .unwrap();
        let before = grid.clone();

        let err = grid
            .place(PieceId(2), ShapeId::LINE_H4, Position::new(2, 1))
            .unwrap_err();
        assert!(matches!(err, PlacementError::Occupied { owner, .. } if owner == PieceId(1)));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_place_rejects_out_of_bounds_without_mutation() {
        let mut grid = GridState::new();
        let err = grid
            .place(PieceId(1), ShapeId::LINE_H4, Position::new(0, 0))
            .unwrap_err();
        assert!(matches!(
            err,
            PlacementError::OutOfBounds { position } if position == Position::new(-1, 0)
        ));
        assert_eq!(grid, GridState::new());
    }

    #[test]
    fn test_extreme_anchors_are_off_board() {
        let mut grid = GridState::new();
        for anchor in [
            Position::new(i32::MAX, 0),
            Position::new(i32::MIN, 0),
            Position::new(0, i32::MAX),
            Position::new(i32::MIN, i32::MIN),
        ] {
            for shape in [ShapeId::O, ShapeId::LINE_H4, ShapeId::BLOCK_3X3] {
                let err = grid.place(PieceId(1), shape, anchor).unwrap_err();
                assert!(matches!(err, PlacementError::OutOfBounds { .. }), "{shape} at {anchor}");
                assert_eq!(
                    BitGrid::EMPTY.with_footprint(shape.offsets(), anchor),
                    BitGrid::EMPTY
                );
            }
        }
        assert_eq!(grid, GridState::new());
        assert_eq!(Position::new(i32::MAX, 0).offset_by(Offset::new(1, 0)), None);
        assert_eq!(Position::new(0, i32::MIN).offset_by(Offset::new(0, -1)), None);
    }

    #[test]
    fn test_place_rejects_duplicate_id() {
        let mut grid = GridState::new();
        grid.place(PieceId(1), ShapeId::SINGLE, Position::new(0, 0))
            .unwrap();
        let err = grid
            .place(PieceId(1), ShapeId::SINGLE, Position::new(5, 5))
            .unwrap_err();
        assert!(matches!(err, PlacementError::DuplicatePiece { .. }));
        assert!(!grid.is_occupied(Position::new(5, 5)));
    }

    #[test]
    fn test_remove_cell_tracks_piece_lifetime() {
        let mut grid = GridState::new();
        grid.place(PieceId(7), ShapeId::LINE_V2, Position::new(4, 4))
            .unwrap();

        let first = grid.remove_cell(Position::new(4, 4)).unwrap();
        assert_eq!(first.owner, PieceId(7));
        assert!(!first.piece_destroyed);
        assert_eq!(grid.piece(PieceId(7)).unwrap().remaining_cells(), 1);
        assert_consistent(&grid);

        let second = grid.remove_cell(Position::new(4, 5)).unwrap();
        assert!(second.piece_destroyed);
        assert!(grid.piece(PieceId(7)).is_none());
        assert_eq!(grid.occupied_count(), 0);

        assert!(grid.remove_cell(Position::new(4, 5)).is_none());
        assert!(grid.remove_cell(Position::new(-3, 2)).is_none());
        assert_consistent(&grid);
    }

    #[test]
    fn test_reset() {
        let mut grid = GridState::new();
        grid.place(PieceId(1), ShapeId::BLOCK_3X3, Position::new(1, 1))
            .unwrap();
        grid.reset();
        assert_eq!(grid, GridState::new());
        assert_eq!(grid.placed_pieces().count(), 0);
    }

    #[test]
    fn test_bit_grid_full_lines() {
        let mut bits = BitGrid::EMPTY;
        for x in 0..COLUMNS {
            bits.occupy(Position::from_index(x, 2));
        }
        for y in 0..ROWS {
            bits.occupy(Position::from_index(5, y));
        }
        assert_eq!(bits.full_rows().collect::<Vec<_>>(), [2]);
        assert_eq!(bits.full_columns().collect::<Vec<_>>(), [5]);
        assert_eq!(bits.occupied_count(), COLUMNS + ROWS - 1);
        assert_eq!(BitGrid::FULL.full_rows().count(), ROWS);
        assert_eq!(BitGrid::FULL.full_columns().count(), COLUMNS);
    }

    #[test]
    fn test_bit_grid_with_footprint_ignores_off_board_cells() {
        let bits = BitGrid::EMPTY.with_footprint(ShapeId::LINE_H4.offsets(), Position::new(0, 0));
        assert_eq!(bits.occupied_count(), 3);
        assert_eq!(bits.row_bits(0), 0b0111);
    }

    #[test]
    fn test_bit_grid_serialization() {
        let mut bits = BitGrid::EMPTY;
        for x in 0..COLUMNS {
            bits.occupy(Position::from_index(x, 0));
        }
        bits.occupy(Position::new(0, 7));
        bits.occupy(Position::new(7, 7));

        let serialized = serde_json::to_string(&bits).unwrap();
        assert_eq!(serialized, "\"ff,00,00,00,00,00,00,81\"");
        let deserialized: BitGrid = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, bits);

        assert!(serde_json::from_str::<BitGrid>("\"ff,00\"").is_err());
        assert!(serde_json::from_str::<BitGrid>("\"ff,00,00,00,00,00,00,zz\"").is_err());
        assert!(serde_json::from_str::<BitGrid>("\"ff,00,00,00,00,00,00,100\"").is_err());
    }

    #[test]
    fn test_display_renders_top_row_first() {
        let mut bits = BitGrid::EMPTY;
        bits.occupy(Position::new(0, 0));
        bits.occupy(Position::new(7, 7));
        let rendered = bits.to_string();
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), ROWS);
        assert_eq!(lines[0], ".......#");
        assert_eq!(lines[ROWS - 1], "#.......");
    }
}
