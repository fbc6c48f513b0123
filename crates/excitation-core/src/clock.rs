//! Simulation clock for the fixed-step diffusion loop.
//!
//! The step counter is the single source of truth for simulated time.
//! Step `k` covers the interval `[k * dt, (k + 1) * dt]`: diffusion reads
//! neighbor potentials at the start of the interval and transitions are
//! drained up to its end. Times are derived from the counter on demand and
//! never accumulated, so rounding error does not build up over a long run.

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Step counter would overflow.
    #[error("step counter overflow: cannot advance beyond u32::MAX")]
    StepOverflow,

    /// The run length cannot be turned into a step count.
    #[error("invalid run duration: final_time={final_time}, dt={dt}")]
    InvalidDuration {
        /// Requested total simulated time.
        final_time: f64,
        /// Diffusion time step.
        dt: f64,
    },
}

/// Step counter with a fixed time step and a fixed number of steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimClock {
    /// Index of the next step to execute (0-indexed).
    step: u32,
    /// Time step.
    dt: f64,
    /// Number of steps in the run.
    total_steps: u32,
}

impl SimClock {
    /// Create a clock at step 0.
    pub const fn new(dt: f64, total_steps: u32) -> Self {
        Self {
            step: 0,
            dt,
            total_steps,
        }
    }

    /// Create a clock covering `final_time` in steps of `dt`.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidDuration`] if the step count cannot be
    /// computed (see [`SimClock::steps_for`]).
    pub fn for_duration(final_time: f64, dt: f64) -> Result<Self, ClockError> {
        Ok(Self::new(dt, Self::steps_for(final_time, dt)?))
    }

    /// Number of steps needed to cover `final_time`: `ceil(final_time / dt)`.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidDuration`] if either input is not
    /// finite, `dt` is not positive, `final_time` is negative, or the count
    /// does not fit in a `u32`.
    pub fn steps_for(final_time: f64, dt: f64) -> Result<u32, ClockError> {
        let invalid = || ClockError::InvalidDuration { final_time, dt };
        if !final_time.is_finite() || !dt.is_finite() || dt <= 0.0 || final_time < 0.0 {
            return Err(invalid());
        }
        let steps = (final_time / dt).ceil();
        if !steps.is_finite() || steps > f64::from(u32::MAX) {
            return Err(invalid());
        }
        // Range checked above: steps is a non-negative integer <= u32::MAX.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let steps = steps as u32;
        Ok(steps)
    }

    /// Index of the next step to execute.
    pub const fn step(&self) -> u32 {
        self.step
    }

    /// Number of steps in the run.
    pub const fn total_steps(&self) -> u32 {
        self.total_steps
    }

    /// The time step.
    pub const fn dt(&self) -> f64 {
        self.dt
    }

    /// Simulated time at the start of the current step.
    pub fn step_start(&self) -> f64 {
        f64::from(self.step) * self.dt
    }

    /// Simulated time at the end of the current step.
    pub fn step_end(&self) -> f64 {
        (f64::from(self.step) + 1.0) * self.dt
    }

    /// Returns `true` once every step of the run has executed.
    pub const fn is_finished(&self) -> bool {
        self.step >= self.total_steps
    }

    /// Move to the next step. Returns the new step index.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::StepOverflow`] if the counter would exceed
    /// `u32::MAX`.
    pub fn advance(&mut self) -> Result<u32, ClockError> {
        self.step = self.step.checked_add(1).ok_or(ClockError::StepOverflow)?;
        Ok(self.step)
    }
}
