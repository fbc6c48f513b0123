//! The square grid of cells.
//!
//! Cells are stored row-major in a single `Vec`, fixed at construction and
//! never resized. Access goes through [`Grid::get`] and [`Grid::get_mut`],
//! which return `None` outside the grid instead of panicking.
//!
//! # Boundaries
//!
//! The medium has reflective (Neumann) boundaries: a neighbor that would
//! fall outside the grid is replaced by the neighbor on the opposite side
//! of the cell. On row 0 the missing "up" neighbor is the cell in row 1,
//! on the last column the missing "right" neighbor is the cell to the left,
//! and so on. In a 1×1 grid there is no opposite neighbor either, and the
//! cell reflects onto itself.

use serde::{Deserialize, Serialize};

use excitation_types::{Cell, CellPosition, CellState};

/// Errors that can occur when building a grid.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// A grid must hold at least one cell.
    #[error("grid size must be at least 1")]
    Empty,

    /// The number of cells does not match `size * size`.
    #[error("grid of size {size} needs {expected} cells, got {actual}")]
    CellCountMismatch {
        /// Side length of the grid.
        size: usize,
        /// Required number of cells.
        expected: usize,
        /// Number of cells supplied.
        actual: usize,
    },

    /// `size * size` does not fit in `usize`.
    #[error("grid size {0} is too large")]
    TooLarge(usize),
}

/// A square grid of cells in row-major order.
///
/// Serializes as `{"size": N, "cells": [...]}` with cells in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Build a grid from `size * size` `(state, value)` pairs in row-major
    /// order. Every cell starts with a last transition time of 0.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Empty`] if `size` is 0 and
    /// [`GridError::CellCountMismatch`] if the sequence has the wrong length.
    pub fn from_cells<I>(size: usize, cells: I) -> Result<Self, GridError>
    where
        I: IntoIterator<Item = (CellState, f64)>,
    {
        if size == 0 {
            return Err(GridError::Empty);
        }
        let expected = size.checked_mul(size).ok_or(GridError::TooLarge(size))?;
        let cells: Vec<Cell> = cells
            .into_iter()
            .map(|(state, value)| Cell::new(state, value))
            .collect();
        if cells.len() != expected {
            return Err(GridError::CellCountMismatch {
                size,
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self { size, cells })
    }

    /// Build a resting grid with every cell at `value`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Empty`] if `size` is 0.
    pub fn filled(size: usize, value: f64) -> Result<Self, GridError> {
        let count = size.checked_mul(size).ok_or(GridError::TooLarge(size))?;
        Self::from_cells(size, std::iter::repeat_n((CellState::Rest, value), count))
    }

    /// Side length of the grid.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Number of cells (`size * size`).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`: a grid holds at least one cell.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns `true` if `position` lies inside the grid.
    pub const fn contains(&self, position: CellPosition) -> bool {
        position.row < self.size && position.col < self.size
    }

    /// The cell at `position`, or `None` outside the grid.
    pub fn get(&self, position: CellPosition) -> Option<&Cell> {
        self.offset(position).and_then(|i| self.cells.get(i))
    }

    /// Mutable access to the cell at `position`, or `None` outside the grid.
    pub fn get_mut(&mut self, position: CellPosition) -> Option<&mut Cell> {
        self.offset(position).and_then(|i| self.cells.get_mut(i))
    }

    /// Iterate over `(position, cell)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellPosition, &Cell)> + '_ {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (position_of(i, size), cell))
    }

    /// Iterate over the positions of the grid in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = CellPosition> + use<> {
        let size = self.size;
        (0..size).flat_map(move |row| (0..size).map(move |col| CellPosition::new(row, col)))
    }

    /// Iterate over the rows of the grid.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks(self.size)
    }

    /// Count the cells in each state.
    pub fn state_counts(&self) -> StateCounts {
        let mut counts = StateCounts::default();
        for cell in &self.cells {
            counts.record(cell.state);
        }
        counts
    }

    /// The four neighbors of `position` under reflective boundaries, in the
    /// order up, down, left, right.
    ///
    /// Returns `None` if `position` is outside the grid.
    pub const fn neighbors(&self, position: CellPosition) -> Option<[CellPosition; 4]> {
        if !self.contains(position) {
            return None;
        }
        let CellPosition { row, col } = position;
        let last = self.size.saturating_sub(1);
        let (up, down) = reflect(row, last);
        let (left, right) = reflect(col, last);
        Some([
            CellPosition::new(up, col),
            CellPosition::new(down, col),
            CellPosition::new(row, left),
            CellPosition::new(row, right),
        ])
    }

    fn offset(&self, position: CellPosition) -> Option<usize> {
        if !self.contains(position) {
            return None;
        }
        position
            .row
            .checked_mul(self.size)
            .and_then(|base| base.checked_add(position.col))
    }
}

/// Number of cells in each state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateCounts {
    /// Cells at rest.
    pub rest: usize,
    /// Cells in the increasing phase.
    pub increasing: usize,
    /// Cells in the decreasing phase.
    pub decreasing: usize,
}

impl StateCounts {
    fn record(&mut self, state: CellState) {
        let slot = match state {
            CellState::Rest => &mut self.rest,
            CellState::Increasing => &mut self.increasing,
            CellState::Decreasing => &mut self.decreasing,
        };
        *slot = slot.saturating_add(1);
    }

    /// Cells in either excited phase.
    pub const fn excited(&self) -> usize {
        self.increasing.saturating_add(self.decreasing)
    }
}

/// Reflected predecessor and successor of `index` along one axis whose
/// last valid index is `last`.
const fn reflect(index: usize, last: usize) -> (usize, usize) {
    let before = if index > 0 {
        index.saturating_sub(1)
    } else if index < last {
        index.saturating_add(1)
    } else {
        index
    };
    let after = if index < last {
        index.saturating_add(1)
    } else if index > 0 {
        index.saturating_sub(1)
    } else {
        index
    };
    (before, after)
}

#[allow(clippy::arithmetic_side_effects, clippy::integer_division)]
const fn position_of(offset: usize, size: usize) -> CellPosition {
    // size >= 1 is guaranteed by the constructor.
    CellPosition::new(offset / size, offset % size)
}
