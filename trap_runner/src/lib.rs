//! # Trap Runner Library
//!
//! Drives configured units of work through the fatal-error mechanism. Each
//! unit runs under its own checkpoint, so a fatal error inside one unit is
//! reported against that unit and the runner moves on to the next.
//!
//! # Module Structure
//!
//! - [`config`] - Runner configuration (`[shared]`, `[trap]`, `[[unit]]`)
//! - [`unit`] - Executing one unit and classifying how it ended
//! - [`error`] - Runner error type

#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod unit;

pub use crate::config::{RunnerConfig, UnitConfig};
pub use crate::error::RunnerError;
pub use crate::unit::{RunSummary, UnitReport, UnitStatus, run_unit, run_units};
