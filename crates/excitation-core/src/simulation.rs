//! Simulation driver: owns the grid, the event queue, and the clock.
//!
//! [`Simulation::run`] executes `ceil(final_time / dt)` steps. Each step is
//! a diffusion pass over the resting cells followed by a transition pass
//! that drains every event due by the end of the step:
//!
//! ```text
//! step k:  diffusion   @ t = k * dt        (snapshot read, live write)
//!          transitions @ t <= (k + 1) * dt (queue drain)
//! ```
//!
//! The run is single-threaded and deterministic: the same grid and
//! configuration always produce the same final grid.

use tracing::{debug, info};

use crate::clock::{ClockError, SimClock};
use crate::config::{ConfigError, MediumConfig, SimulationConfig};
use crate::diffusion::{self, DiffusionOutcome};
use crate::grid::{Grid, StateCounts};
use crate::queue::EventQueue;
use crate::schedule::{self, ScheduleError};
use crate::transition::{self, TransitionError, TransitionOutcome};
use crate::voltage::Kinetics;

/// Errors that can occur during a simulation run.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// The configuration is not usable.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A transition time could not be computed.
    #[error("schedule error: {source}")]
    Schedule {
        /// The underlying schedule error.
        #[from]
        source: ScheduleError,
    },

    /// Applying due transitions failed.
    #[error("transition error: {source}")]
    Transition {
        /// The underlying transition error.
        #[from]
        source: TransitionError,
    },
}

/// Summary of a single step's execution.
#[derive(Debug, Clone, PartialEq)]
pub struct StepSummary {
    /// Index of the step that was executed.
    pub step: u32,
    /// Simulated time at the end of the step.
    pub time: f64,
    /// Diffusion results: cells that fired this step.
    pub diffusion: DiffusionOutcome,
    /// Transition results: events applied this step.
    pub transitions: TransitionOutcome,
    /// Events still queued after the step.
    pub pending_events: usize,
    /// Cells in each state after the step.
    pub counts: StateCounts,
}

/// Result of a complete run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Number of steps executed.
    pub steps: u32,
    /// Simulated time at the end of the last step.
    pub final_time: f64,
    /// Cells that fired over the whole run.
    pub activations: usize,
    /// Transition events applied over the whole run.
    pub transitions: usize,
    /// Events still queued at the end of the run.
    pub pending_events: usize,
    /// Cells in each state at the end of the run.
    pub counts: StateCounts,
}

/// Callback invoked after each step completes.
///
/// Implementations can use this to render intermediate frames, collect
/// statistics, etc.
pub trait StepCallback {
    /// Called after a step completes successfully.
    fn on_step(&mut self, summary: &StepSummary, grid: &Grid);
}

/// A no-op step callback.
pub struct NoOpCallback;

impl StepCallback for NoOpCallback {
    fn on_step(&mut self, _summary: &StepSummary, _grid: &Grid) {}
}

/// The excitable medium together with its pending transitions.
#[derive(Debug, Clone)]
pub struct Simulation {
    grid: Grid,
    queue: EventQueue,
    clock: SimClock,
    medium: MediumConfig,
    kinetics: Kinetics,
}

impl Simulation {
    /// Prepare a run over `grid`.
    ///
    /// Validates `config`, derives the step count from `run.final_time`
    /// and `medium.dt`, and queues the pending event of every cell that
    /// starts excited.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Config`] for invalid configuration,
    /// [`SimulationError::Clock`] if the step count is out of range, and
    /// [`SimulationError::Schedule`] if an initially excited cell has an
    /// undefined transition time.
    pub fn new(grid: Grid, config: &SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let medium = config.medium;
        let kinetics = config.run.kinetics();
        let clock = SimClock::for_duration(config.run.final_time, medium.dt)?;

        let mut queue = EventQueue::new();
        let seeded = schedule::seed_initial_events(&grid, &mut queue, &medium, kinetics)?;

        info!(
            size = grid.size(),
            steps = clock.total_steps(),
            dt = medium.dt,
            a_incr = kinetics.a_incr,
            a_decr = kinetics.a_decr,
            initial_events = seeded,
            "Simulation prepared"
        );

        Ok(Self {
            grid,
            queue,
            clock,
            medium,
            kinetics,
        })
    }

    /// Execute one step: diffusion, then transitions.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Schedule`] if a cell fires with a
    /// non-positive `a_incr`, [`SimulationError::Transition`] if a due
    /// event cannot be applied, and [`SimulationError::Clock`] if the step
    /// counter overflows.
    pub fn step(&mut self) -> Result<StepSummary, SimulationError> {
        let step = self.clock.step();
        let step_end = self.clock.step_end();

        let diffusion = diffusion::diffusion_step(
            &mut self.grid,
            &mut self.queue,
            &self.medium,
            self.kinetics,
            &self.clock,
        )?;
        let transitions = transition::process_transitions(
            &mut self.grid,
            &mut self.queue,
            &self.medium,
            self.kinetics,
            step_end,
        )?;
        self.clock.advance()?;

        let summary = StepSummary {
            step,
            time: step_end,
            diffusion,
            transitions,
            pending_events: self.queue.len(),
            counts: self.grid.state_counts(),
        };
        debug!(
            step,
            time = step_end,
            activated = summary.diffusion.activated.len(),
            to_decreasing = summary.transitions.to_decreasing,
            to_rest = summary.transitions.to_rest,
            pending = summary.pending_events,
            "Step completed"
        );
        Ok(summary)
    }

    /// Run every remaining step, invoking `callback` after each.
    ///
    /// # Errors
    ///
    /// Returns the first [`SimulationError`] raised by a step.
    pub fn run(&mut self, callback: &mut dyn StepCallback) -> Result<RunSummary, SimulationError> {
        let mut steps: u32 = 0;
        let mut activations: usize = 0;
        let mut transitions: usize = 0;
        let mut final_time = self.clock.step_start();

        info!(total_steps = self.clock.total_steps(), "Simulation starting");

        while !self.clock.is_finished() {
            let summary = self.step()?;
            steps = steps.saturating_add(1);
            activations = activations.saturating_add(summary.diffusion.activated.len());
            transitions = transitions.saturating_add(summary.transitions.processed());
            final_time = summary.time;
            callback.on_step(&summary, &self.grid);
        }

        let result = RunSummary {
            steps,
            final_time,
            activations,
            transitions,
            pending_events: self.queue.len(),
            counts: self.grid.state_counts(),
        };
        log_run_end(&result);
        Ok(result)
    }

    /// The current grid.
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The pending transition events.
    pub const fn queue(&self) -> &EventQueue {
        &self.queue
    }

    /// The step clock.
    pub const fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Consume the simulation and return the grid.
    pub fn into_grid(self) -> Grid {
        self.grid
    }
}

/// Log the end of a run.
fn log_run_end(result: &RunSummary) {
    info!(
        steps = result.steps,
        final_time = result.final_time,
        activations = result.activations,
        transitions = result.transitions,
        pending_events = result.pending_events,
        rest = result.counts.rest,
        increasing = result.counts.increasing,
        decreasing = result.counts.decreasing,
        "Simulation ended"
    );
}
