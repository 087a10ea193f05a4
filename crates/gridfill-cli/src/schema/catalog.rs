use gridfill_engine::{ShapeColor, ShapeId};
use serde::Serialize;

/// One catalog shape as written by `catalog --json`.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub index: usize,
    pub name: &'static str,
    pub color: ShapeColor,
    pub cell_count: usize,
    /// `(dx, dy)` cell offsets relative to the anchor
    pub offsets: Vec<(i8, i8)>,
}

impl From<ShapeId> for CatalogEntry {
    fn from(shape: ShapeId) -> Self {
        Self {
            index: shape.index(),
            name: shape.name(),
            color: shape.color(),
            cell_count: shape.cell_count(),
            offsets: shape.offsets().iter().map(|o| (o.dx(), o.dy())).collect(),
        }
    }
}
