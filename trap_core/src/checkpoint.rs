//! Establishing, resuming and clearing recovery points.
//!
//! [`establish_checkpoint`] is a call site with two possible returns:
//! [`Outcome::Established`] when the guarded code ran to completion, or
//! [`Outcome::Resumed`] when a fatal error signalled somewhere inside it
//! transferred control back here. The recovery point is removed again on
//! every exit path by a scoped guard, so an unbalanced push/pop cannot be
//! written.
//!
//! Signals that target an inner checkpoint never reach an outer one. Panics
//! that are not fatal errors pass through untouched.

use std::any::Any;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use tracing::debug;

use crate::context::{self, ContextToken};
use crate::error::FatalError;
use crate::signal::Resumption;

/// Result of running code under a checkpoint.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// Reached by normal execution; carries the guarded code's value.
    Established(T),
    /// Reached by an unwind; carries the signalled message.
    Resumed(String),
}

impl<T> Outcome<T> {
    /// Whether control came back through a fatal error.
    #[inline]
    pub fn is_resumed(&self) -> bool {
        matches!(self, Outcome::Resumed(_))
    }

    /// The signalled message, if resumed.
    pub fn resumed_message(&self) -> Option<&str> {
        match self {
            Outcome::Resumed(message) => Some(message),
            Outcome::Established(_) => None,
        }
    }

    /// Map the value of a normally completed scope.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Established(value) => Outcome::Established(f(value)),
            Outcome::Resumed(message) => Outcome::Resumed(message),
        }
    }

    /// Convert into a caller-visible result.
    pub fn into_result(self) -> Result<T, FatalError> {
        match self {
            Outcome::Established(value) => Ok(value),
            Outcome::Resumed(message) => Err(FatalError::new(message)),
        }
    }
}

impl<T> From<Outcome<T>> for Result<T, FatalError> {
    fn from(outcome: Outcome<T>) -> Self {
        outcome.into_result()
    }
}

/// Scoped registration of one recovery point.
///
/// Acquiring pushes an error context; releasing (drop, or [`clear`]) pops
/// it. Not `Send`: the context lives in this thread's stack.
///
/// [`clear`]: CheckpointGuard::clear
#[derive(Debug)]
pub(crate) struct CheckpointGuard {
    token: ContextToken,
    _thread_bound: PhantomData<*const ()>,
}

static_assertions::assert_not_impl_any!(CheckpointGuard: Send, Sync);

impl CheckpointGuard {
    fn acquire() -> Self {
        Self {
            token: context::push(),
            _thread_bound: PhantomData,
        }
    }

    fn token(&self) -> ContextToken {
        self.token
    }

    /// Decide whether an unwind payload was aimed at this checkpoint.
    ///
    /// Returns the message for our own resumption marker or for a raised
    /// [`FatalError`]; anything else is handed back for re-raising.
    fn claim(&self, payload: Box<dyn Any + Send>) -> Result<String, Box<dyn Any + Send>> {
        if payload.is::<Resumption>() {
            return context::take_message(self.token).ok_or(payload);
        }
        payload
            .downcast::<FatalError>()
            .map(|err| err.into_message())
    }

    /// Remove the recovery point now.
    fn clear(self) {
        drop(self);
    }
}

impl Drop for CheckpointGuard {
    fn drop(&mut self) {
        context::pop(self.token);
    }
}

/// Run `f` under a new innermost recovery point.
///
/// Returns [`Outcome::Established`] with `f`'s value if it completes, or
/// [`Outcome::Resumed`] with the message if a fatal error signalled inside
/// `f` (in checkpoint/resume or exception mode) comes back to this call.
/// The recovery point is cleared before this function returns or unwinds.
///
/// # Example
///
/// ```rust
/// use trap_core::{establish_checkpoint, signal, Outcome};
///
/// let outcome: Outcome<()> = establish_checkpoint(|| signal("bad input"));
/// assert_eq!(outcome, Outcome::Resumed("bad input".to_string()));
/// ```
pub fn establish_checkpoint<F, R>(f: F) -> Outcome<R>
where
    F: FnOnce() -> R,
{
    let guard = CheckpointGuard::acquire();
    let token = guard.token();
    debug!(%token, depth = context::depth(), "checkpoint established");

    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => {
            guard.clear();
            Outcome::Established(value)
        }
        Err(payload) => match guard.claim(payload) {
            Ok(message) => {
                guard.clear();
                debug!(%token, %message, "resumed at checkpoint");
                Outcome::Resumed(message)
            }
            Err(payload) => {
                guard.clear();
                panic::resume_unwind(payload)
            }
        },
    }
}

/// Run `f`, converting a fatal error into `Err`.
///
/// The handler form of [`establish_checkpoint`], for call sites that want a
/// plain `Result`.
///
/// ```rust
/// use trap_core::{catch_fatal, fatal};
///
/// assert_eq!(catch_fatal(|| 7), Ok(7));
/// let err = catch_fatal(|| -> i32 { fatal!("missing {}", "entry point") }).unwrap_err();
/// assert_eq!(err.message(), "missing entry point");
/// ```
pub fn catch_fatal<F, R>(f: F) -> Result<R, FatalError>
where
    F: FnOnce() -> R,
{
    establish_checkpoint(f).into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::{CheckpointResume, FatalStrategy, NativeException};

    fn resume(message: &str) -> ! {
        CheckpointResume.raise(message.to_string())
    }

    fn throw(message: &str) -> ! {
        NativeException.raise(message.to_string())
    }

    #[test]
    fn completes_without_signal() {
        let base = context::depth();
        let outcome = establish_checkpoint(|| {
            assert_eq!(context::depth(), base + 1);
            42
        });
        assert_eq!(outcome, Outcome::Established(42));
        assert_eq!(context::depth(), base);
    }

    #[test]
    fn resume_returns_message_at_call_site() {
        let outcome: Outcome<()> = establish_checkpoint(|| resume("bad input"));
        assert_eq!(outcome, Outcome::Resumed("bad input".to_string()));
        assert_eq!(context::depth(), 0);
    }

    #[test]
    fn raised_fatal_error_is_caught_as_resumed() {
        let outcome: Outcome<()> = establish_checkpoint(|| throw("bad input"));
        assert_eq!(outcome.resumed_message(), Some("bad input"));
        assert_eq!(context::depth(), 0);
    }

    #[test]
    fn innermost_checkpoint_wins() {
        let outer = establish_checkpoint(|| {
            let inner: Outcome<()> = establish_checkpoint(|| resume("x"));
            assert_eq!(inner, Outcome::Resumed("x".to_string()));
            "outer done"
        });
        assert_eq!(outer, Outcome::Established("outer done"));
    }

    #[test]
    fn cleared_checkpoint_falls_back_to_outer() {
        let outer: Outcome<()> = establish_checkpoint(|| {
            let inner = establish_checkpoint(|| 1);
            assert_eq!(inner, Outcome::Established(1));
            assert_eq!(context::depth(), 1);
            resume("after inner cleared")
        });
        assert_eq!(outer.resumed_message(), Some("after inner cleared"));
        assert_eq!(context::depth(), 0);
    }

    #[test]
    fn drops_run_while_unwinding_to_checkpoint() {
        struct Flag<'a>(&'a std::cell::Cell<bool>);
        impl Drop for Flag<'_> {
            fn drop(&mut self) {
                self.0.set(true);
            }
        }

        let dropped = std::cell::Cell::new(false);
        let outcome: Outcome<()> = establish_checkpoint(|| {
            let _flag = Flag(&dropped);
            throw("unwound")
        });
        assert!(outcome.is_resumed());
        assert!(dropped.get());
    }

    #[test]
    fn foreign_panic_passes_through_and_clears() {
        let result = panic::catch_unwind(|| {
            let _ = establish_checkpoint(|| -> () { std::panic::panic_any(17u32) });
        });
        let payload = result.unwrap_err();
        assert_eq!(payload.downcast_ref::<u32>(), Some(&17));
        assert_eq!(context::depth(), 0);
    }

    #[test]
    fn checkpoint_is_reusable_after_resume() {
        for round in 0..3 {
            let outcome: Outcome<()> = establish_checkpoint(|| resume(&format!("round {round}")));
            assert_eq!(outcome.resumed_message(), Some(format!("round {round}").as_str()));
        }
        assert_eq!(context::depth(), 0);
    }

    #[test]
    fn outcome_conversions() {
        let ok: Outcome<u8> = Outcome::Established(3);
        assert_eq!(ok.clone().map(|v| v * 2), Outcome::Established(6));
        assert_eq!(ok.into_result(), Ok(3));

        let resumed: Outcome<u8> = Outcome::Resumed("boom".to_string());
        assert!(resumed.is_resumed());
        let as_result: Result<u8, FatalError> = resumed.into();
        assert_eq!(as_result, Err(FatalError::new("boom")));
    }

    #[test]
    fn catch_fatal_returns_err() {
        assert_eq!(catch_fatal(|| "fine"), Ok("fine"));
        let err = catch_fatal(|| -> u8 { resume("nope") }).unwrap_err();
        assert_eq!(err.message(), "nope");
    }
}
