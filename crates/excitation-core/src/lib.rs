//! Simulation core for the Excitation excitable-medium simulator.
//!
//! Each resting cell of a square grid is driven by diffusion from its four
//! neighbors. When its potential crosses the activation threshold it fires:
//! the potential rises exponentially to the peak, decays exponentially to
//! the rest floor, and the cell rests again. Diffusion runs on a fixed time
//! step; the phase changes of firing cells are continuous-time events held
//! in a priority queue and drained between steps.
//!
//! # Modules
//!
//! - [`clock`] -- Step counter deriving step start and end times.
//! - [`config`] -- Configuration loading from `excitation-config.yaml` into
//!   strongly-typed structs.
//! - [`diffusion`] -- The discrete Laplacian update of resting cells.
//! - [`grid`] -- The square row-major [`Grid`] and reflective neighbors.
//! - [`queue`] -- The stable min-time [`EventQueue`].
//! - [`schedule`] -- Closed-form transition times and initial events.
//! - [`simulation`] -- The [`Simulation`] driver and step loop.
//! - [`transition`] -- Draining due events and advancing cell phases.
//! - [`voltage`] -- Analytical potential reconstruction.
//!
//! # Step Order
//!
//! ```text
//! for step in 0..ceil(final_time / dt):
//!     diffusion   (reads a snapshot at step * dt, writes the live grid)
//!     transitions (drains events due at or before (step + 1) * dt)
//! ```
//!
//! [`Grid`]: grid::Grid
//! [`EventQueue`]: queue::EventQueue
//! [`Simulation`]: simulation::Simulation

pub mod clock;
pub mod config;
pub mod diffusion;
pub mod grid;
pub mod queue;
pub mod schedule;
pub mod simulation;
pub mod transition;
pub mod voltage;

pub use clock::{ClockError, SimClock};
pub use config::{ConfigError, SimulationConfig};
pub use grid::{Grid, GridError, StateCounts};
pub use queue::{EventQueue, QueueError};
pub use simulation::{NoOpCallback, RunSummary, Simulation, SimulationError, StepCallback, StepSummary};
pub use voltage::Kinetics;
