//! The fixed-step diffusion update of resting cells.
//!
//! Every resting cell moves toward the average of its four neighbors:
//!
//! ```text
//! laplacian = up + down + left + right - 4 * self
//! new       = old + dt * diffusion_coeff * laplacian
//! ```
//!
//! Neighbor potentials come from a snapshot of the grid taken before any
//! cell is updated, reconstructed at the start of the step. Excited cells
//! are never diffusion targets, but they still feed their resting
//! neighbors through their reconstructed potential. A resting cell whose
//! new potential exceeds the activation threshold fires: it becomes
//! increasing at the end of the step and its peak event is scheduled.

use tracing::debug;

use excitation_types::{CellPosition, CellState};

use crate::clock::SimClock;
use crate::config::MediumConfig;
use crate::grid::Grid;
use crate::queue::EventQueue;
use crate::schedule::{self, ScheduleError};
use crate::voltage::{self, Kinetics};

/// What one diffusion pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffusionOutcome {
    /// Cells that crossed the activation threshold, in row-major order.
    pub activated: Vec<CellPosition>,
    /// Peak events queued for the activated cells.
    pub events_scheduled: usize,
}

/// Discrete Laplacian of the cell at `position` in `snapshot`, with
/// neighbor potentials reconstructed at `query_time`.
///
/// Returns `None` if `position` is outside the grid.
pub fn laplacian(
    snapshot: &Grid,
    position: CellPosition,
    kinetics: Kinetics,
    query_time: f64,
) -> Option<f64> {
    let center = snapshot.get(position)?;
    let mut sum = 0.0;
    for neighbor in snapshot.neighbors(position)? {
        let cell = snapshot.get(neighbor)?;
        sum += voltage::neighbor_value(cell, kinetics, query_time);
    }
    Some(4.0_f64.mul_add(-center.value, sum))
}

/// Run one diffusion pass over every resting cell of `grid`.
///
/// Reads neighbor potentials at `clock.step_start()` from a snapshot of the
/// grid, writes new potentials into the live grid, and schedules a peak
/// event for each cell that fires. Fired cells record `clock.step_end()`
/// as their transition time.
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidParameter`] if a cell fires while
/// `a_incr` is not positive.
pub fn diffusion_step(
    grid: &mut Grid,
    queue: &mut EventQueue,
    medium: &MediumConfig,
    kinetics: Kinetics,
    clock: &SimClock,
) -> Result<DiffusionOutcome, ScheduleError> {
    let snapshot = grid.clone();
    let step_start = clock.step_start();
    let step_end = clock.step_end();
    let gain = medium.dt * medium.diffusion_coeff;
    let mut outcome = DiffusionOutcome::default();

    for (position, old) in snapshot.iter() {
        if old.state != CellState::Rest {
            continue;
        }
        let Some(diffusion_term) = laplacian(&snapshot, position, kinetics, step_start) else {
            continue;
        };
        let new_value = gain.mul_add(diffusion_term, old.value);
        let Some(cell) = grid.get_mut(position) else {
            continue;
        };

        if new_value > medium.threshold {
            cell.transition(CellState::Increasing, new_value, step_end);
            let scheduled = schedule::schedule_increase_to_decrease(
                queue,
                position,
                new_value,
                step_end,
                kinetics.a_incr,
                medium.peak,
            )?;
            if scheduled.is_some() {
                outcome.events_scheduled = outcome.events_scheduled.saturating_add(1);
            }
            outcome.activated.push(position);
        } else {
            cell.value = new_value;
        }
    }

    if !outcome.activated.is_empty() {
        debug!(
            step = clock.step(),
            activated = outcome.activated.len(),
            "cells crossed activation threshold"
        );
    }
    Ok(outcome)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn pos(row: usize, col: usize) -> CellPosition {
        CellPosition::new(row, col)
    }

    fn value_at(grid: &Grid, row: usize, col: usize) -> f64 {
        grid.get(pos(row, col)).unwrap().value
    }

    /// 3x3 resting grid with `center` in the middle and zeros elsewhere.
    fn center_grid(center: (CellState, f64)) -> Grid {
        let mut cells = vec![(CellState::Rest, 0.0); 9];
        if let Some(slot) = cells.get_mut(4) {
            *slot = center;
        }
        Grid::from_cells(3, cells).unwrap()
    }

    #[test]
    fn top_row_up_neighbor_mirrors_down_neighbor() {
        #[rustfmt::skip]
        let values = [
            0.10, 0.20, 0.30,
            0.40, 0.50, 0.60,
            0.70, 0.80, 0.90,
        ];
        let grid = Grid::from_cells(3, values.iter().map(|&v| (CellState::Rest, v))).unwrap();
        let kinetics = Kinetics::new(1.0, -1.0);

        let [up, down, _, _] = grid.neighbors(pos(0, 1)).unwrap();
        let up_value = grid.get(up).unwrap().value;
        let down_value = grid.get(down).unwrap().value;
        assert!((up_value - down_value).abs() < TOLERANCE);
        assert!((up_value - 0.50).abs() < TOLERANCE);

        // up + down + left + right - 4 * self = 0.5 + 0.5 + 0.1 + 0.3 - 0.8
        let lap = laplacian(&grid, pos(0, 1), kinetics, 0.0).unwrap();
        assert!((lap - 0.6).abs() < TOLERANCE);

        // Corner (0, 0): up->down (0.4), left->right (0.2), both doubled.
        let corner = laplacian(&grid, pos(0, 0), kinetics, 0.0).unwrap();
        assert!((corner - (0.4 + 0.4 + 0.2 + 0.2 - 0.4)).abs() < TOLERANCE);
    }

    #[test]
    fn one_step_spreads_center_potential() {
        let mut grid = center_grid((CellState::Rest, 0.25));
        let mut queue = EventQueue::new();
        let clock = SimClock::new(0.2, 1);

        let outcome = diffusion_step(
            &mut grid,
            &mut queue,
            &MediumConfig::default(),
            Kinetics::new(1.0, -1.0),
            &clock,
        )
        .unwrap();

        // Center: 0.25 + 0.2 * 0.5 * (0 - 4 * 0.25) = 0.15
        assert!((value_at(&grid, 1, 1) - 0.15).abs() < TOLERANCE);
        // Edge cells see the center twice through the reflective boundary:
        // 0 + 0.2 * 0.5 * (0.25 + 0.25) = 0.05
        for (row, col) in [(0, 1), (1, 0), (1, 2), (2, 1)] {
            assert!((value_at(&grid, row, col) - 0.05).abs() < TOLERANCE);
        }
        // Corners touch only zero-valued cells.
        for (row, col) in [(0, 0), (0, 2), (2, 0), (2, 2)] {
            assert!(value_at(&grid, row, col).abs() < TOLERANCE);
        }
        assert!(outcome.activated.is_empty());
        assert!(queue.is_empty());
        assert_eq!(grid.state_counts().rest, 9);
    }

    #[test]
    fn updates_read_the_snapshot_not_the_live_grid() {
        // Row-major order updates (0, 1) before (1, 1); if (1, 1) read the
        // live grid it would see the new 0.05 instead of 0.
        let mut grid = center_grid((CellState::Rest, 0.25));
        let mut queue = EventQueue::new();
        diffusion_step(
            &mut grid,
            &mut queue,
            &MediumConfig::default(),
            Kinetics::new(1.0, -1.0),
            &SimClock::new(0.2, 1),
        )
        .unwrap();

        let symmetric = [(0, 1), (1, 0), (1, 2), (2, 1)]
            .iter()
            .all(|&(r, c)| (value_at(&grid, r, c) - value_at(&grid, 0, 1)).abs() < TOLERANCE);
        assert!(symmetric);
        assert!((value_at(&grid, 1, 1) - 0.15).abs() < TOLERANCE);
    }

    #[test]
    fn crossing_cell_fires_with_one_pending_event() {
        let mut cells = vec![(CellState::Rest, 0.0); 9];
        if let Some(slot) = cells.get_mut(1) {
            *slot = (CellState::Rest, 0.1);
        }
        if let Some(slot) = cells.get_mut(4) {
            *slot = (CellState::Increasing, 0.9);
        }
        let mut grid = Grid::from_cells(3, cells).unwrap();
        let mut queue = EventQueue::new();
        let clock = SimClock::new(0.2, 1);

        let outcome = diffusion_step(
            &mut grid,
            &mut queue,
            &MediumConfig::default(),
            Kinetics::new(1.0, -1.0),
            &clock,
        )
        .unwrap();

        // (0, 1): 0.1 + 0.1 * (0.9 + 0.9 + 0 + 0 - 0.4) = 0.24 > 0.2
        let fired = grid.get(pos(0, 1)).unwrap();
        assert_eq!(fired.state, CellState::Increasing);
        assert!((fired.value - 0.24).abs() < TOLERANCE);
        assert!((fired.last_transition_time - 0.2).abs() < TOLERANCE);

        assert_eq!(outcome.activated, vec![pos(0, 1)]);
        assert_eq!(outcome.events_scheduled, 1);
        assert_eq!(queue.pending_for(pos(0, 1)), 1);
        assert_eq!(queue.len(), 1);

        let event = queue.peek_min().unwrap();
        assert!((event.event_time - (0.2 + (1.0_f64 / 0.24).ln())).abs() < TOLERANCE);

        // (1, 0) sees 0.9 twice but stays below threshold: 0.1 * 1.8 = 0.18
        let below = grid.get(pos(1, 0)).unwrap();
        assert_eq!(below.state, CellState::Rest);
        assert!((below.value - 0.18).abs() < TOLERANCE);
    }

    #[test]
    fn excited_cells_are_not_diffusion_targets() {
        let mut grid = center_grid((CellState::Decreasing, 0.8));
        let mut queue = EventQueue::new();
        diffusion_step(
            &mut grid,
            &mut queue,
            &MediumConfig::default(),
            Kinetics::new(1.0, -1.0),
            &SimClock::new(0.2, 1),
        )
        .unwrap();

        let center = grid.get(pos(1, 1)).unwrap();
        assert_eq!(center.state, CellState::Decreasing);
        assert!((center.value - 0.8).abs() < TOLERANCE);
        // Neighbors still feel it: 0.1 * (0.8 + 0.8) = 0.16
        assert!((value_at(&grid, 0, 1) - 0.16).abs() < TOLERANCE);
        assert_eq!(grid.state_counts().rest, 8);
    }

    #[test]
    fn excited_neighbors_are_reconstructed_at_step_start() {
        // Center increased from 0.5 at t = 0; step 1 starts at t = 0.2.
        let mut grid = center_grid((CellState::Increasing, 0.5));
        let mut queue = EventQueue::new();
        let mut clock = SimClock::new(0.2, 2);
        clock.advance().unwrap();

        diffusion_step(
            &mut grid,
            &mut queue,
            &MediumConfig::default(),
            Kinetics::new(1.0, -1.0),
            &clock,
        )
        .unwrap();

        let center_now = 0.5 * 0.2_f64.exp();
        assert!((value_at(&grid, 0, 1) - 0.1 * 2.0 * center_now).abs() < TOLERANCE);
    }

    #[test]
    fn firing_with_non_positive_rate_is_fatal() {
        let mut grid = center_grid((CellState::Rest, 0.5));
        let mut queue = EventQueue::new();
        let result = diffusion_step(
            &mut grid,
            &mut queue,
            &MediumConfig::default(),
            Kinetics::new(-1.0, -1.0),
            &SimClock::new(0.2, 1),
        );
        assert!(matches!(
            result,
            Err(ScheduleError::InvalidParameter { position, .. }) if position == pos(1, 1)
        ));
    }
}
