//! Processing of due transition events.
//!
//! After each diffusion pass, every queued event due at or before the end
//! of the step is applied in time order:
//!
//! | Cell state | Becomes | Value | Next event |
//! |------------|---------|-------|------------|
//! | Increasing | Decreasing | `peak` | rest time at `a_decr` |
//! | Decreasing | Rest | `rest` | none |
//! | Rest | (unchanged) | -- | none |
//!
//! Transitions are stamped with the step end time rather than the exact
//! event time, so the next phase starts on the step grid.

use tracing::{trace, warn};

use excitation_types::{CellPosition, CellState};

use crate::config::MediumConfig;
use crate::grid::Grid;
use crate::queue::{EventQueue, QueueError};
use crate::schedule::{self, ScheduleError};
use crate::voltage::Kinetics;

/// Errors that can occur while processing transitions.
#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    /// A queue operation failed.
    #[error("queue error: {source}")]
    Queue {
        /// The underlying queue error.
        #[from]
        source: QueueError,
    },

    /// Scheduling the follow-up event failed.
    #[error("schedule error: {source}")]
    Schedule {
        /// The underlying schedule error.
        #[from]
        source: ScheduleError,
    },

    /// An event names a cell outside the grid.
    #[error("event for unknown cell {0}")]
    UnknownCell(CellPosition),
}

/// What one transition pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionOutcome {
    /// Increasing cells that reached the peak and started decreasing.
    pub to_decreasing: usize,
    /// Decreasing cells that reached the floor and came to rest.
    pub to_rest: usize,
    /// Events popped for cells already at rest.
    pub stale: usize,
}

impl TransitionOutcome {
    /// Total number of events popped.
    pub const fn processed(&self) -> usize {
        self.to_decreasing
            .saturating_add(self.to_rest)
            .saturating_add(self.stale)
    }
}

/// Apply every queued event due at or before `step_end_time`.
///
/// Follow-up rest events are pushed back onto the queue and applied in the
/// same pass if they are also due.
///
/// # Errors
///
/// Returns [`TransitionError::UnknownCell`] for an event outside the grid
/// and [`TransitionError::Schedule`] if the rest time is undefined.
pub fn process_transitions(
    grid: &mut Grid,
    queue: &mut EventQueue,
    medium: &MediumConfig,
    kinetics: Kinetics,
    step_end_time: f64,
) -> Result<TransitionOutcome, TransitionError> {
    let mut outcome = TransitionOutcome::default();

    while !queue.is_empty() && queue.peek_min()?.event_time <= step_end_time {
        let event = queue.pop_min()?;
        let position = event.position;
        let cell = grid
            .get_mut(position)
            .ok_or(TransitionError::UnknownCell(position))?;

        match cell.state {
            CellState::Increasing => {
                cell.transition(CellState::Decreasing, medium.peak, step_end_time);
                schedule::schedule_decrease_to_rest(
                    queue,
                    position,
                    step_end_time,
                    kinetics.a_decr,
                    medium.peak,
                    medium.rest,
                )?;
                outcome.to_decreasing = outcome.to_decreasing.saturating_add(1);
            }
            CellState::Decreasing => {
                cell.transition(CellState::Rest, medium.rest, step_end_time);
                trace!(%position, step_end_time, "cell returned to rest");
                outcome.to_rest = outcome.to_rest.saturating_add(1);
            }
            CellState::Rest => {
                warn!(
                    %position,
                    event_time = event.event_time,
                    "event popped for resting cell, ignored"
                );
                outcome.stale = outcome.stale.saturating_add(1);
            }
        }
    }

    Ok(outcome)
}
