//! The fatal-error entry point.
//!
//! [`signal`] is the only call ordinary code needs, whatever the active
//! [`Mode`](crate::Mode). It never returns: control either comes back at a
//! checkpoint, reaches an exception handler, or the process terminates.
//!
//! Signalling while the thread is already unwinding (for example from a
//! `Drop` run by an earlier signal) is escalated to abort.

use std::io::{self, Write};
use std::process;
use tracing::error;
use trap_common::consts::ABORT_DIAGNOSTIC_PREFIX;

use crate::mode;

/// Zero-sized unwind payload used by checkpoint/resume mode.
///
/// The message travels in the targeted context's slot, not in the payload.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Resumption;

/// Report a fatal internal error.
///
/// Dispatches to the strategy of the process-wide mode:
///
/// - abort: diagnostic on stderr (debug builds), then abort;
/// - checkpoint/resume: the innermost checkpoint on this thread returns
///   `Outcome::Resumed(message)`, or abort if there is none;
/// - exception: a [`FatalError`](crate::FatalError) carrying `message`
///   unwinds to the nearest handler.
pub fn signal(message: impl Into<String>) -> ! {
    let message = message.into();
    if std::thread::panicking() {
        report_and_abort(&message, true);
    }
    mode::strategy(mode::active()).raise(message)
}

/// Write the diagnostic, flush and abort the process.
#[cold]
#[inline(never)]
pub(crate) fn report_and_abort(message: &str, while_unwinding: bool) -> ! {
    #[cfg(debug_assertions)]
    {
        let qualifier = if while_unwinding { " while unwinding" } else { "" };
        error!(%message, while_unwinding, "fatal error, aborting");
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "{ABORT_DIAGNOSTIC_PREFIX}{qualifier}: {message}");
        let _ = stderr.flush();
    }
    #[cfg(not(debug_assertions))]
    {
        let _ = message;
        error!(while_unwinding, "fatal error, aborting");
        let _ = io::stderr().flush();
    }
    process::abort()
}
