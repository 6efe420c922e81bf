//! Background workers owned by the runtime.
//!
//! The [`SimulationWorker`] is the only task that touches the game state.
//! Everything else talks to it through [`Command`]s.

mod simulation;

pub use simulation::{Command, SimulationWorker};
