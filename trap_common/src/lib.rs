//! Trap Common Library
//!
//! This crate provides the shared mode enumeration, constants and
//! configuration loading utilities for all trap workspace crates.
//!
//! # Module Structure
//!
//! - [`mode`] - Fatal-error handling mode shared by the mechanism and its drivers
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Workspace-wide limits and default paths
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use trap_common::prelude::*;
//!
//! assert_eq!(Mode::default(), Mode::Exception);
//! ```

pub mod config;
pub mod consts;
pub mod mode;
pub mod prelude;
