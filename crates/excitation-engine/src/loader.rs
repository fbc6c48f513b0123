//! Grid file loader.
//!
//! A grid file is plain whitespace-separated text. The first token is the
//! side length `N`, followed by `N * N` cells in row-major order, each
//! written as an integer state code and a real potential:
//!
//! ```text
//! 3
//! 0 0.0   0 0.0   0 0.0
//! 0 0.0   1 0.5   0 0.0
//! 0 0.0   0 0.0   0 0.0
//! ```
//!
//! State codes are `0` (rest), `1` (increasing) and `2` (decreasing).
//! Line breaks carry no meaning and tokens after the last cell are ignored.

use std::path::Path;

use excitation_core::{Grid, GridError};
use excitation_types::{CellPosition, CellState};

/// Errors that can occur when loading a grid file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read grid file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The file holds no tokens at all.
    #[error("grid file is empty: expected the grid size as the first token")]
    MissingSize,

    /// The first token is not a usable grid size.
    #[error("invalid grid size {token:?}: expected a positive integer")]
    InvalidSize {
        /// The offending token.
        token: String,
    },

    /// A cell token could not be parsed.
    #[error("invalid token {token:?} at index {index}")]
    InvalidToken {
        /// Zero-based index of the token in the file.
        index: usize,
        /// The offending token.
        token: String,
    },

    /// A cell carries a state code outside `0..=2`.
    #[error("unknown state code {code} for cell {position}")]
    UnknownState {
        /// The cell the code belongs to.
        position: CellPosition,
        /// The offending code.
        code: i64,
    },

    /// The file ends before every cell has been read.
    #[error("grid file is truncated: expected {expected} cells, found {found}")]
    Truncated {
        /// Number of cells the size token announced.
        expected: usize,
        /// Number of complete cells present.
        found: usize,
    },

    /// The parsed cells do not form a valid grid.
    #[error("invalid grid: {source}")]
    Grid {
        /// The underlying grid error.
        #[from]
        source: GridError,
    },
}

/// Read and parse the grid file at `path`.
pub fn load_grid(path: &Path) -> Result<Grid, LoadError> {
    let contents = std::fs::read_to_string(path)?;
    parse_grid(&contents)
}

/// Parse a grid from the text format described in the module docs.
pub fn parse_grid(input: &str) -> Result<Grid, LoadError> {
    let mut tokens = input.split_whitespace().enumerate();

    let (_, size_token) = tokens.next().ok_or(LoadError::MissingSize)?;
    let size = match size_token.parse::<usize>() {
        Ok(size) if size > 0 => size,
        _ => {
            return Err(LoadError::InvalidSize {
                token: size_token.to_owned(),
            });
        }
    };
    let expected = size.checked_mul(size).ok_or_else(|| LoadError::InvalidSize {
        token: size_token.to_owned(),
    })?;

    // A bogus size token must not drive the allocation.
    let mut cells = Vec::with_capacity(expected.min(input.len()));
    for (found, position) in positions(size).take(expected).enumerate() {
        let truncated = || LoadError::Truncated { expected, found };

        let (index, code_token) = tokens.next().ok_or_else(truncated)?;
        let code = code_token
            .parse::<i64>()
            .ok()
            .ok_or_else(|| invalid_token(index, code_token))?;
        let state = CellState::from_code(code).ok_or(LoadError::UnknownState { position, code })?;

        let (index, value_token) = tokens.next().ok_or_else(truncated)?;
        let value = value_token
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| invalid_token(index, value_token))?;

        cells.push((state, value));
    }

    Ok(Grid::from_cells(size, cells)?)
}

fn invalid_token(index: usize, token: &str) -> LoadError {
    LoadError::InvalidToken {
        index,
        token: token.to_owned(),
    }
}

fn positions(size: usize) -> impl Iterator<Item = CellPosition> {
    (0..size).flat_map(move |row| (0..size).map(move |col| CellPosition::new(row, col)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn parses_row_major_cells() {
        let grid = parse_grid("2\n0 0.1 1 0.5\n2 0.9 0 0.0\n").unwrap();

        assert_eq!(grid.size(), 2);
        let center = grid.get(CellPosition::new(0, 1)).unwrap();
        assert_eq!(center.state, CellState::Increasing);
        assert_eq!(center.value, 0.5);
        assert_eq!(
            grid.get(CellPosition::new(1, 0)).unwrap().state,
            CellState::Decreasing
        );
        assert_eq!(grid.get(CellPosition::new(0, 0)).unwrap().value, 0.1);
    }

    #[test]
    fn layout_does_not_matter() {
        let a = parse_grid("2 0 0.1 0 0.2 0 0.3 0 0.4").unwrap();
        let b = parse_grid("2\n\n0 0.1\n0 0.2\n\t0 0.3   0 0.4\n").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn trailing_tokens_are_ignored() {
        let grid = parse_grid("1 1 0.5 garbage 7").unwrap();
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn empty_input_is_missing_size() {
        assert!(matches!(parse_grid("  \n"), Err(LoadError::MissingSize)));
    }

    #[test]
    fn rejects_bad_size() {
        assert!(matches!(parse_grid("0"), Err(LoadError::InvalidSize { .. })));
        assert!(matches!(parse_grid("-3"), Err(LoadError::InvalidSize { .. })));
        assert!(matches!(parse_grid("two"), Err(LoadError::InvalidSize { .. })));
    }

    #[test]
    fn reports_truncated_input() {
        let err = parse_grid("2 0 0.1 0 0.2 0").unwrap_err();
        assert!(matches!(
            err,
            LoadError::Truncated {
                expected: 4,
                found: 2
            }
        ));
    }

    #[test]
    fn reports_bad_token_index() {
        let err = parse_grid("1 0 abc").unwrap_err();
        match err {
            LoadError::InvalidToken { index, token } => {
                assert_eq!(index, 2);
                assert_eq!(token, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_non_finite_values() {
        assert!(matches!(
            parse_grid("1 0 NaN"),
            Err(LoadError::InvalidToken { index: 2, .. })
        ));
    }

    #[test]
    fn reports_unknown_state_with_position() {
        let err = parse_grid("2 0 0.0 0 0.0 3 0.5 0 0.0").unwrap_err();
        assert!(matches!(
            err,
            LoadError::UnknownState { position, code: 3 } if position == CellPosition::new(1, 0)
        ));
    }

    #[test]
    fn loads_bundled_grid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("grids")
            .join("center-9.txt");
        let grid = load_grid(&path).unwrap();
        assert_eq!(grid.size(), 9);
        assert_eq!(grid.state_counts().increasing, 1);
        assert_eq!(
            grid.get(CellPosition::new(4, 4)).unwrap().state,
            CellState::Increasing
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_grid(Path::new("does-not-exist.grid")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
