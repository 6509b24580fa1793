//! Prelude module for common re-exports.
//!
//! ```rust
//! use trap_common::prelude::*;
//! ```

// ─── Mode ───────────────────────────────────────────────────────────
pub use crate::mode::{Mode, ParseModeError};

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig, TrapConfig};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{CHECKPOINT_STACK_RESERVE, MAX_UNIT_DEPTH};
