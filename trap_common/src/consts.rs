//! Workspace-wide constants for the trap crates.
//!
//! Single source of truth for numeric limits and default paths.

/// Capacity reserved up front for each thread's checkpoint stack.
///
/// Nesting deeper than this is allowed; it only costs a reallocation on push.
pub const CHECKPOINT_STACK_RESERVE: usize = 16;

/// Deepest call nesting a runner unit may request.
pub const MAX_UNIT_DEPTH: u32 = 256;

/// Prefix of the diagnostic written to stderr before the process aborts.
pub const ABORT_DIAGNOSTIC_PREFIX: &str = "There was a fatal error";

/// Default runner configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/trap/runner.toml";
