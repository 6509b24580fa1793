//! Error types for fatal-error propagation.

use thiserror::Error;
use trap_common::mode::Mode;

/// A fatal internal error.
///
/// The only error kind at this layer: a free-form message. Any
/// classification is the caller's job before signalling. In
/// [`Mode::Exception`] this is the value carried by the unwind; in every
/// unwinding mode it is what [`catch_fatal`](crate::catch_fatal) returns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FatalError {
    message: String,
}

impl FatalError {
    /// Create a fatal error carrying `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message given to `signal`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Consume the error, returning its message.
    pub fn into_message(self) -> String {
        self.message
    }
}

/// Errors from process-wide mode selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModeError {
    /// The mode was already fixed, by an earlier install or by a first use.
    #[error("fatal-error mode already fixed to {active}, cannot switch to {requested}")]
    AlreadyFixed {
        /// Mode in effect for the rest of the process.
        active: Mode,
        /// Mode that was asked for.
        requested: Mode,
    },

    /// The binary was built with `panic = "abort"`, so nothing can unwind.
    #[error("{requested} mode needs unwinding, but this build aborts on panic")]
    UnwindUnavailable {
        /// Mode that was asked for.
        requested: Mode,
    },
}
