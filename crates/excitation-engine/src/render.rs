//! Text renderings of a grid.

use clap::ValueEnum;
use excitation_core::Grid;
use excitation_types::CellState;

/// Output format for the final grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Bordered character matrix.
    #[default]
    Ascii,
    /// The grid serialized as JSON.
    Json,
}

/// Render `grid` in the given format. The result ends with a newline.
pub fn render(grid: &Grid, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Ascii => Ok(render_ascii(grid)),
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(grid)?;
            out.push('\n');
            Ok(out)
        }
    }
}

/// Render `grid` as a bordered matrix: `x` marks increasing cells, `o`
/// decreasing cells, and resting cells are blank.
///
/// ```text
/// +-------+
/// |       |
/// |   x   |
/// |   o   |
/// +-------+
/// ```
pub fn render_ascii(grid: &Grid) -> String {
    let rule = "--".repeat(grid.size());
    let mut out = String::new();

    out.push_str("+-");
    out.push_str(&rule);
    out.push_str("+\n");

    for row in grid.rows() {
        out.push_str("| ");
        for cell in row {
            out.push_str(glyph(cell.state));
        }
        out.push_str("|\n");
    }

    out.push('+');
    out.push_str(&rule);
    out.push_str("-+\n");
    out
}

const fn glyph(state: CellState) -> &'static str {
    match state {
        CellState::Rest => "  ",
        CellState::Increasing => "x ",
        CellState::Decreasing => "o ",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> Grid {
        Grid::from_cells(
            3,
            vec![
                (CellState::Rest, 0.0),
                (CellState::Rest, 0.0),
                (CellState::Rest, 0.0),
                (CellState::Rest, 0.0),
                (CellState::Increasing, 0.5),
                (CellState::Rest, 0.0),
                (CellState::Rest, 0.0),
                (CellState::Decreasing, 0.9),
                (CellState::Rest, 0.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn ascii_matches_bordered_layout() {
        let expected = "\
+-------+
|       |
|   x   |
|   o   |
+-------+
";
        assert_eq!(render_ascii(&sample()), expected);
    }

    #[test]
    fn ascii_single_cell() {
        let grid = Grid::from_cells(1, vec![(CellState::Increasing, 0.5)]).unwrap();
        assert_eq!(render_ascii(&grid), "+---+\n| x |\n+---+\n");
    }

    #[test]
    fn every_line_has_the_same_width() {
        let grid = Grid::filled(7, 0.0).unwrap();
        let rendered = render_ascii(&grid);
        let widths: Vec<usize> = rendered.lines().map(str::len).collect();
        assert_eq!(widths.len(), 9);
        assert!(widths.iter().all(|&w| w == 17));
    }

    #[test]
    fn json_carries_size_and_cells() {
        let out = render(&sample(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["size"], 3);
        assert_eq!(value["cells"].as_array().unwrap().len(), 9);
        assert_eq!(value["cells"][4]["state"], "increasing");
        assert_eq!(value["cells"][7]["state"], "decreasing");
    }
}
