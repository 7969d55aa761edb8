//! Single-node CPU scheduling simulator.
//!
//! Programs are parsed from a line-oriented description, admitted against a
//! frame allocator, and advanced by a quantum-bounded round-robin stepper.

pub mod io;
pub mod kernel;

pub use kernel::{Driver, Scheduler, SimulatorConfig};
