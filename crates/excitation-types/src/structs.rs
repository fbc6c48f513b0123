//! Core entity structs: the grid cell and the scheduled transition event.

use serde::{Deserialize, Serialize};

use crate::enums::CellState;
use crate::position::CellPosition;

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// One site of the excitable medium.
///
/// `value` is the potential recorded at `last_transition_time`. For a
/// resting cell it is the current potential. For an increasing or
/// decreasing cell it is the snapshot taken when the phase began; the
/// potential at any later time follows from the phase's exponential law.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Cell {
    /// Current phase.
    pub state: CellState,
    /// Potential at `last_transition_time`.
    pub value: f64,
    /// Simulation time of the most recent state change.
    pub last_transition_time: f64,
}

impl Cell {
    /// Create a cell as loaded from input, with a last transition at time 0.
    pub const fn new(state: CellState, value: f64) -> Self {
        Self {
            state,
            value,
            last_transition_time: 0.0,
        }
    }

    /// Move the cell into `state` at `time`, recording `value` as the new
    /// phase snapshot.
    pub const fn transition(&mut self, state: CellState, value: f64, time: f64) {
        self.state = state;
        self.value = value;
        self.last_transition_time = time;
    }
}

// ---------------------------------------------------------------------------
// Transition Event
// ---------------------------------------------------------------------------

/// A scheduled state change for one cell.
///
/// Events are immutable once created and consumed exactly once by the
/// transition processor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionEvent {
    /// The cell that will transition.
    pub position: CellPosition,
    /// Simulation time at which the transition is due.
    pub event_time: f64,
}

impl TransitionEvent {
    /// Create an event for `position` due at `event_time`.
    pub const fn new(position: CellPosition, event_time: f64) -> Self {
        Self {
            position,
            event_time,
        }
    }
}
