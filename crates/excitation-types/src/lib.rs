//! Shared type definitions for the Excitation medium simulator.
//!
//! This crate holds the plain data that flows between the simulation core
//! and the engine binary. It carries no behavior beyond construction,
//! conversion, and display.
//!
//! # Modules
//!
//! - [`enums`] -- The three-phase [`CellState`] and its wire codes
//! - [`position`] -- [`CellPosition`] grid coordinates
//! - [`structs`] -- [`Cell`] and [`TransitionEvent`]

pub mod enums;
pub mod position;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::CellState;
pub use position::CellPosition;
pub use structs::{Cell, TransitionEvent};
