//! Configuration module for loading simulation parameters.
//!
//! Numeric constants carry their literature source next to the default.

mod parameters;

pub use parameters::{ExportConfig, SimulationParameters};
