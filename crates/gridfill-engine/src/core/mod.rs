pub use self::{grid::*, placement::*, shape::*};

pub(crate) mod grid;
pub(crate) mod placement;
pub(crate) mod shape;

/// Number of columns on the board.
pub const COLUMNS: usize = 8;
/// Number of rows on the board.
pub const ROWS: usize = 8;
