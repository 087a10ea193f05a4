use std::path::PathBuf;

use gridfill_engine::ShapeId;

use crate::{schema::catalog::CatalogEntry, util::Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct CatalogArg {
    /// Write the catalog as JSON instead of text art
    #[arg(long)]
    json: bool,
    /// Output file path for the JSON catalog
    #[arg(long, requires = "json")]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &CatalogArg) -> anyhow::Result<()> {
    let CatalogArg { json, output } = arg;

    if *json {
        let entries = ShapeId::all().map(CatalogEntry::from).collect::<Vec<_>>();
        Output::save_json(&entries, output.clone())?;
        return Ok(());
    }

    for shape in ShapeId::all() {
        println!(
            "{shape} ({} cells, {})",
            shape.cell_count(),
            shape.color()
        );
        print!("{}", render_shape(shape));
        println!();
    }
    Ok(())
}

/// Draws a shape with the highest row first.
///
/// `@` marks the anchor cell and `#` the other cells. An anchor outside the
/// footprint is drawn as `+`.
fn render_shape(shape: ShapeId) -> String {
    let (min_x, min_y, max_x, max_y) = shape.bounds();
    let (min_x, min_y) = (min_x.min(0), min_y.min(0));
    let (max_x, max_y) = (max_x.max(0), max_y.max(0));
    let offsets = shape.offsets();

    let mut art = String::new();
    for dy in (min_y..=max_y).rev() {
        let mut line = String::new();
        for dx in min_x..=max_x {
            let filled = offsets.iter().any(|o| o.dx() == dx && o.dy() == dy);
            let c = match (filled, dx == 0 && dy == 0) {
                (true, true) => '@',
                (true, false) => '#',
                (false, true) => '+',
                (false, false) => '.',
            };
            line.push(c);
        }
        art.push_str(line.trim_end_matches('.'));
        art.push('\n');
    }
    art
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_row_shapes() {
        assert_eq!(render_shape(ShapeId::SINGLE), "@\n");
        assert_eq!(render_shape(ShapeId::LINE_H4), "#@##\n");
    }

    #[test]
    fn test_render_marks_one_anchor() {
        for shape in ShapeId::all() {
            let art = render_shape(shape);
            let anchors = art.chars().filter(|c| matches!(c, '@' | '+')).count();
            let cells = art.chars().filter(|c| matches!(c, '@' | '#')).count();
            assert_eq!(anchors, 1, "{shape}:\n{art}");
            assert_eq!(cells, shape.cell_count(), "{shape}:\n{art}");
        }
    }
}
