//! Fatal-error handling mode.
//!
//! Exactly one mode is active per process. The mechanism in `trap_core`
//! specializes its signal path on it; drivers read it from configuration.
//!
//! | Mode | On fatal error |
//! |------|----------------|
//! | [`Mode::Abort`] | always terminates the process |
//! | [`Mode::CheckpointResume`] | unwinds to the innermost checkpoint, else terminates |
//! | [`Mode::Exception`] | raises a `FatalError` through native unwinding |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Terminal behaviour selected for fatal errors.
///
/// Uses kebab-case serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Report on stderr (debug builds) and abort.
    Abort,
    /// Transfer control to the innermost established checkpoint.
    CheckpointResume,
    /// Raise a typed error value through native unwinding.
    #[default]
    Exception,
}

impl Mode {
    /// All modes, in declaration order.
    pub const ALL: [Mode; 3] = [Mode::Abort, Mode::CheckpointResume, Mode::Exception];

    /// Configuration spelling of the mode.
    pub const fn as_str(self) -> &'static str {
        match self {
            Mode::Abort => "abort",
            Mode::CheckpointResume => "checkpoint-resume",
            Mode::Exception => "exception",
        }
    }

    /// Whether a fatal error in this mode can ever return control to a caller.
    #[inline]
    pub const fn unwinds(self) -> bool {
        !matches!(self, Mode::Abort)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a mode name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mode '{0}' (expected abort, checkpoint-resume or exception)")]
pub struct ParseModeError(pub String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseModeError(s.to_string()))
    }
}
