//! Analytical reconstruction of cell potentials.
//!
//! Between two transitions a cell's potential follows a single exponential:
//! constant at rest, `v0 * exp(a_incr * t)` while increasing, and
//! `v0 * exp(a_decr * t)` while decreasing, where `v0` is the value stored
//! at the last transition and `t` the time elapsed since. The grid stores
//! only that snapshot, and any later potential is recomputed on demand.

use excitation_types::{Cell, CellState};

/// Exponential rates of the two excited phases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinetics {
    /// Rate of the increasing phase (positive for growth).
    pub a_incr: f64,
    /// Rate of the decreasing phase (negative for decay).
    pub a_decr: f64,
}

impl Kinetics {
    /// Create a rate pair.
    pub const fn new(a_incr: f64, a_decr: f64) -> Self {
        Self { a_incr, a_decr }
    }
}

/// Potential of `cell` at `query_time`.
///
/// Resting cells return their stored value unchanged. Increasing and
/// decreasing cells grow or decay exponentially from the value stored at
/// `last_transition_time`. `query_time` is expected to be at or after the
/// cell's last transition.
pub fn reconstruct_value(cell: &Cell, a_incr: f64, a_decr: f64, query_time: f64) -> f64 {
    let elapsed = query_time - cell.last_transition_time;
    match cell.state {
        CellState::Rest => cell.value,
        CellState::Increasing => cell.value * (a_incr * elapsed).exp(),
        CellState::Decreasing => cell.value * (a_decr * elapsed).exp(),
    }
}

/// Potential of a neighboring cell as seen by the diffusion step.
///
/// Resting neighbors are read directly from the snapshot; only excited
/// neighbors go through [`reconstruct_value`].
pub fn neighbor_value(cell: &Cell, kinetics: Kinetics, query_time: f64) -> f64 {
    if cell.state.is_rest() {
        cell.value
    } else {
        reconstruct_value(cell, kinetics.a_incr, kinetics.a_decr, query_time)
    }
}
