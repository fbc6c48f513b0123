//! Grid coordinates.

use serde::{Deserialize, Serialize};

/// Row and column of a cell in the square grid.
///
/// Positions are plain coordinates; whether they fall inside a particular
/// grid is checked by the grid itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellPosition {
    /// Zero-based row index.
    pub row: usize,
    /// Zero-based column index.
    pub col: usize,
}

impl CellPosition {
    /// Create a position from a row and column.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl core::fmt::Display for CellPosition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(usize, usize)> for CellPosition {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}
