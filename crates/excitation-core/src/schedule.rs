//! Closed-form transition times and event scheduling.
//!
//! An excited cell's potential is exponential in time, so the moment it
//! reaches the next threshold is known the instant its phase begins:
//!
//! ```text
//! v0 * exp(rate * t) = threshold   =>   t = ln(threshold / v0) / rate
//! ```
//!
//! Each excited cell therefore carries exactly one pending event, scheduled
//! when it enters its phase.

use tracing::{trace, warn};

use excitation_types::{CellPosition, CellState, TransitionEvent};

use crate::config::MediumConfig;
use crate::grid::Grid;
use crate::queue::EventQueue;
use crate::voltage::Kinetics;

/// Errors that can occur while scheduling transitions.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// A transition time needs the logarithm of a non-positive ratio, or a
    /// division by a zero rate. The run cannot continue.
    #[error(
        "invalid transition parameters for cell {position}: value={value}, threshold={threshold}, rate={rate}"
    )]
    InvalidParameter {
        /// The cell being scheduled.
        position: CellPosition,
        /// The cell's potential at the start of its phase.
        value: f64,
        /// The threshold that ends the phase.
        threshold: f64,
        /// The phase's exponential rate.
        rate: f64,
    },
}

/// Time for a potential of `value` to reach `threshold` at exponential
/// `rate`: `ln(threshold / value) / rate`.
///
/// Returns `None` unless `value` and `threshold` are positive, `rate` is
/// non-zero, and all three are finite.
pub fn calc_transition_time(value: f64, threshold: f64, rate: f64) -> Option<f64> {
    let finite = value.is_finite() && threshold.is_finite() && rate.is_finite();
    if !finite || value <= 0.0 || threshold <= 0.0 || rate.abs() <= 0.0 {
        return None;
    }
    Some((threshold / value).ln() / rate)
}

/// Schedule the Increasing → Decreasing transition of a cell that crossed
/// the activation threshold during the step ending at `step_end_time`.
///
/// The event is due when the potential `value` reaches `peak` at rate
/// `a_incr`. It is queued only if it falls strictly after `step_end_time`;
/// otherwise it is dropped and `Ok(None)` is returned.
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidParameter`] unless `value > 0` and
/// `a_incr > 0`.
pub fn schedule_increase_to_decrease(
    queue: &mut EventQueue,
    position: CellPosition,
    value: f64,
    step_end_time: f64,
    a_incr: f64,
    peak: f64,
) -> Result<Option<TransitionEvent>, ScheduleError> {
    let invalid = || ScheduleError::InvalidParameter {
        position,
        value,
        threshold: peak,
        rate: a_incr,
    };
    if a_incr <= 0.0 {
        return Err(invalid());
    }
    let offset = calc_transition_time(value, peak, a_incr).ok_or_else(invalid)?;
    let event_time = step_end_time + offset;

    if event_time > step_end_time {
        let event = TransitionEvent::new(position, event_time);
        trace!(%position, event_time, "scheduled increase -> decrease");
        queue.push(event);
        Ok(Some(event))
    } else {
        warn!(
            %position,
            value,
            peak,
            step_end_time,
            "peak time is not in the future, decrease event dropped"
        );
        Ok(None)
    }
}

/// Schedule the Decreasing → Rest transition of a cell that reached `peak`
/// at `step_end_time`. The event is due when the potential decays to
/// `rest` at rate `a_decr`.
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidParameter`] if `a_decr` is zero or
/// either threshold is not positive.
pub fn schedule_decrease_to_rest(
    queue: &mut EventQueue,
    position: CellPosition,
    step_end_time: f64,
    a_decr: f64,
    peak: f64,
    rest: f64,
) -> Result<TransitionEvent, ScheduleError> {
    let offset =
        calc_transition_time(peak, rest, a_decr).ok_or(ScheduleError::InvalidParameter {
            position,
            value: peak,
            threshold: rest,
            rate: a_decr,
        })?;
    let event = TransitionEvent::new(position, step_end_time + offset);
    trace!(%position, event_time = event.event_time, "scheduled decrease -> rest");
    queue.push(event);
    Ok(event)
}

/// Queue the pending event of every cell that starts the run excited.
///
/// Increasing cells are due when they reach `medium.peak`, decreasing cells
/// when they reach `medium.rest`, both measured from time 0. Events whose
/// time is not positive are still queued and fire in the first step.
/// Returns the number of events queued.
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidParameter`] for the first excited cell
/// whose transition time is undefined.
pub fn seed_initial_events(
    grid: &Grid,
    queue: &mut EventQueue,
    medium: &MediumConfig,
    kinetics: Kinetics,
) -> Result<usize, ScheduleError> {
    let mut seeded: usize = 0;
    for (position, cell) in grid.iter() {
        let (threshold, rate) = match cell.state {
            CellState::Rest => continue,
            CellState::Increasing => (medium.peak, kinetics.a_incr),
            CellState::Decreasing => (medium.rest, kinetics.a_decr),
        };
        let event_time = calc_transition_time(cell.value, threshold, rate).ok_or(
            ScheduleError::InvalidParameter {
                position,
                value: cell.value,
                threshold,
                rate,
            },
        )?;
        trace!(%position, state = %cell.state, event_time, "seeded initial event");
        queue.push(TransitionEvent::new(position, event_time));
        seeded = seeded.saturating_add(1);
    }
    Ok(seeded)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn pos(row: usize, col: usize) -> CellPosition {
        CellPosition::new(row, col)
    }

    #[test]
    fn transition_time_solves_exponential() {
        let t = calc_transition_time(0.5, 1.0, 2.0).unwrap();
        assert!((t - 2.0_f64.ln() / 2.0).abs() < TOLERANCE);
        assert!((0.5 * (2.0 * t).exp() - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn transition_time_with_decay_is_positive() {
        let t = calc_transition_time(1.0, 0.001, -1.0).unwrap();
        assert!((t - 1000.0_f64.ln()).abs() < TOLERANCE);
    }

    #[test]
    fn transition_time_rejects_undefined_inputs() {
        assert!(calc_transition_time(0.0, 1.0, 1.0).is_none());
        assert!(calc_transition_time(-0.5, 1.0, 1.0).is_none());
        assert!(calc_transition_time(0.5, 0.0, 1.0).is_none());
        assert!(calc_transition_time(0.5, 1.0, 0.0).is_none());
        assert!(calc_transition_time(f64::NAN, 1.0, 1.0).is_none());
    }

    #[test]
    fn increase_schedules_at_peak_time() {
        let mut queue = EventQueue::new();
        let event = schedule_increase_to_decrease(&mut queue, pos(1, 2), 0.25, 0.4, 1.0, 1.0)
            .unwrap()
            .unwrap();

        assert_eq!(event.position, pos(1, 2));
        assert!((event.event_time - (0.4 + 4.0_f64.ln())).abs() < TOLERANCE);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn increase_above_peak_is_dropped() {
        let mut queue = EventQueue::new();
        let event =
            schedule_increase_to_decrease(&mut queue, pos(0, 0), 1.5, 0.4, 1.0, 1.0).unwrap();
        assert!(event.is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn increase_rejects_non_positive_rate() {
        let mut queue = EventQueue::new();
        let err = schedule_increase_to_decrease(&mut queue, pos(2, 3), 0.3, 0.2, 0.0, 1.0)
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("(2, 3)"), "{message}");
        assert!(message.contains("rate=0"), "{message}");
        assert!(queue.is_empty());
    }

    #[test]
    fn increase_rejects_non_positive_value() {
        let mut queue = EventQueue::new();
        let result = schedule_increase_to_decrease(&mut queue, pos(0, 0), 0.0, 0.2, 1.0, 1.0);
        assert!(matches!(
            result,
            Err(ScheduleError::InvalidParameter { position, .. }) if position == pos(0, 0)
        ));
    }

    #[test]
    fn decrease_schedules_at_rest_time() {
        let mut queue = EventQueue::new();
        let event =
            schedule_decrease_to_rest(&mut queue, pos(1, 1), 0.6, -1.0, 1.0, 0.001).unwrap();
        assert!((event.event_time - (0.6 + 1000.0_f64.ln())).abs() < TOLERANCE);
        assert_eq!(queue.pending_for(pos(1, 1)), 1);
    }

    #[test]
    fn decrease_rejects_zero_rate() {
        let mut queue = EventQueue::new();
        let result = schedule_decrease_to_rest(&mut queue, pos(1, 1), 0.6, 0.0, 1.0, 0.001);
        assert!(result.is_err());
        assert!(queue.is_empty());
    }

    #[test]
    fn seeds_one_event_per_excited_cell() {
        let grid = Grid::from_cells(
            2,
            vec![
                (CellState::Increasing, 0.5),
                (CellState::Rest, 0.1),
                (CellState::Rest, 0.0),
                (CellState::Decreasing, 0.5),
            ],
        )
        .unwrap();
        let mut queue = EventQueue::new();
        let seeded = seed_initial_events(
            &grid,
            &mut queue,
            &MediumConfig::default(),
            Kinetics::new(1.0, -1.0),
        )
        .unwrap();

        assert_eq!(seeded, 2);
        let first = queue.pop_min().unwrap();
        assert_eq!(first.position, pos(0, 0));
        assert!((first.event_time - 2.0_f64.ln()).abs() < TOLERANCE);
        let second = queue.pop_min().unwrap();
        assert_eq!(second.position, pos(1, 1));
        assert!((second.event_time - 500.0_f64.ln()).abs() < TOLERANCE);
    }

    #[test]
    fn seeding_rejects_non_positive_excited_value() {
        let grid = Grid::from_cells(1, vec![(CellState::Decreasing, 0.0)]).unwrap();
        let mut queue = EventQueue::new();
        let result = seed_initial_events(
            &grid,
            &mut queue,
            &MediumConfig::default(),
            Kinetics::new(1.0, -1.0),
        );
        assert!(result.is_err());
    }
}
