//! Mode strategies and process-wide mode selection.
//!
//! Each [`Mode`] has one zero-sized [`FatalStrategy`] implementation. The
//! build picks a default through Cargo features:
//!
//! | Feature | Build default |
//! |---------|---------------|
//! | `abort-only` | [`Mode::Abort`] |
//! | `checkpoint-resume` | [`Mode::CheckpointResume`] |
//! | neither | [`Mode::Exception`] |
//!
//! The two features are mutually exclusive; enabling both fails the build.
//! A build with `panic = "abort"` always defaults to [`Mode::Abort`] since
//! nothing can unwind there.
//!
//! A binary may replace the build default once at startup with
//! [`install`]. The first call to [`active`] (every `signal` makes one)
//! fixes the mode for the rest of the process.

use std::sync::OnceLock;
use tracing::info;
use trap_common::mode::Mode;

use crate::context;
use crate::error::{FatalError, ModeError};
use crate::signal::{Resumption, report_and_abort};

#[cfg(all(feature = "abort-only", feature = "checkpoint-resume"))]
compile_error!("features `abort-only` and `checkpoint-resume` are mutually exclusive");

/// Whether this build can unwind at all.
pub const UNWIND_AVAILABLE: bool = cfg!(panic = "unwind");

/// Mode used when nothing was installed.
pub const BUILD_DEFAULT: Mode = if !UNWIND_AVAILABLE || cfg!(feature = "abort-only") {
    Mode::Abort
} else if cfg!(feature = "checkpoint-resume") {
    Mode::CheckpointResume
} else {
    Mode::Exception
};

static ACTIVE: OnceLock<Mode> = OnceLock::new();

/// Terminal behaviour for a fatal error.
///
/// Implementations never return from [`raise`](FatalStrategy::raise).
pub trait FatalStrategy: Sync {
    /// Mode this strategy implements.
    fn mode(&self) -> Mode;

    /// Handle a signalled fatal error.
    fn raise(&self, message: String) -> !;
}

/// Always terminate.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbortOnly;

/// Resume at the innermost checkpoint of the calling thread, else terminate.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckpointResume;

/// Raise a [`FatalError`] through native unwinding.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeException;

impl FatalStrategy for AbortOnly {
    fn mode(&self) -> Mode {
        Mode::Abort
    }

    fn raise(&self, message: String) -> ! {
        report_and_abort(&message, false)
    }
}

impl FatalStrategy for CheckpointResume {
    fn mode(&self) -> Mode {
        Mode::CheckpointResume
    }

    /// Deposit the message and unwind with a zero-sized payload.
    ///
    /// `resume_unwind` skips the panic hook, so nothing is printed on the
    /// way to the checkpoint.
    fn raise(&self, message: String) -> ! {
        match context::deposit(message) {
            Ok(_) => std::panic::resume_unwind(Box::new(Resumption)),
            Err(message) => report_and_abort(&message, false),
        }
    }
}

impl FatalStrategy for NativeException {
    fn mode(&self) -> Mode {
        Mode::Exception
    }

    fn raise(&self, message: String) -> ! {
        std::panic::resume_unwind(Box::new(FatalError::new(message)))
    }
}

static_assertions::assert_eq_size!(AbortOnly, ());
static_assertions::assert_eq_size!(CheckpointResume, ());
static_assertions::assert_eq_size!(NativeException, ());

/// Strategy implementing `mode`.
pub fn strategy(mode: Mode) -> &'static dyn FatalStrategy {
    match mode {
        Mode::Abort => &AbortOnly,
        Mode::CheckpointResume => &CheckpointResume,
        Mode::Exception => &NativeException,
    }
}

/// The process-wide mode. Fixes it on first use.
pub fn active() -> Mode {
    *ACTIVE.get_or_init(|| BUILD_DEFAULT)
}

/// Replace the build default for this process.
///
/// Installing the mode that is already fixed is a no-op.
///
/// # Errors
///
/// - [`ModeError::UnwindUnavailable`] if `mode` unwinds and the build aborts on panic.
/// - [`ModeError::AlreadyFixed`] if a different mode was installed or already used.
pub fn install(mode: Mode) -> Result<Mode, ModeError> {
    install_into(&ACTIVE, mode, UNWIND_AVAILABLE)
}

fn install_into(cell: &OnceLock<Mode>, mode: Mode, unwind_available: bool) -> Result<Mode, ModeError> {
    if mode.unwinds() && !unwind_available {
        return Err(ModeError::UnwindUnavailable { requested: mode });
    }

    let fixed = *cell.get_or_init(|| {
        info!(%mode, "fatal-error mode installed");
        mode
    });

    if fixed == mode {
        Ok(fixed)
    } else {
        Err(ModeError::AlreadyFixed {
            active: fixed,
            requested: mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::{Outcome, establish_checkpoint};

    #[test]
    fn strategies_match_their_mode() {
        for mode in Mode::ALL {
            assert_eq!(strategy(mode).mode(), mode);
        }
    }

    #[test]
    fn build_default_is_consistent_with_panic_strategy() {
        if !UNWIND_AVAILABLE {
            assert_eq!(BUILD_DEFAULT, Mode::Abort);
        }
        #[cfg(not(any(feature = "abort-only", feature = "checkpoint-resume")))]
        if UNWIND_AVAILABLE {
            assert_eq!(BUILD_DEFAULT, Mode::Exception);
        }
    }

    #[test]
    fn build_default_follows_the_one_enabled_feature() {
        let abort_only = cfg!(feature = "abort-only");
        let checkpoint_resume = cfg!(feature = "checkpoint-resume");
        assert!(!(abort_only && checkpoint_resume));

        let expected = match (UNWIND_AVAILABLE, abort_only, checkpoint_resume) {
            (false, _, _) | (true, true, false) => Mode::Abort,
            (true, false, true) => Mode::CheckpointResume,
            _ => Mode::Exception,
        };
        assert_eq!(BUILD_DEFAULT, expected);
    }

    #[test]
    fn install_fixes_first_mode() {
        let cell = OnceLock::new();
        assert_eq!(install_into(&cell, Mode::CheckpointResume, true), Ok(Mode::CheckpointResume));
        assert_eq!(install_into(&cell, Mode::CheckpointResume, true), Ok(Mode::CheckpointResume));
        assert_eq!(
            install_into(&cell, Mode::Exception, true),
            Err(ModeError::AlreadyFixed {
                active: Mode::CheckpointResume,
                requested: Mode::Exception,
            })
        );
    }

    #[test]
    fn install_after_first_use_fails() {
        let cell = OnceLock::new();
        cell.get_or_init(|| Mode::Exception);
        assert!(matches!(
            install_into(&cell, Mode::Abort, true),
            Err(ModeError::AlreadyFixed { .. })
        ));
    }

    #[test]
    fn unwinding_modes_need_unwind_support() {
        let cell = OnceLock::new();
        assert_eq!(
            install_into(&cell, Mode::Exception, false),
            Err(ModeError::UnwindUnavailable {
                requested: Mode::Exception
            })
        );
        assert!(cell.get().is_none());
        assert_eq!(install_into(&cell, Mode::Abort, false), Ok(Mode::Abort));
    }

    #[test]
    fn native_exception_carries_message() {
        let payload =
            std::panic::catch_unwind(|| -> () { NativeException.raise("typed".to_string()) })
                .unwrap_err();
        let err = payload.downcast::<FatalError>().unwrap();
        assert_eq!(err.message(), "typed");
    }

    #[test]
    fn native_exception_crosses_thread_join() {
        let joined = std::thread::spawn(|| -> () { NativeException.raise("uncaught".to_string()) })
            .join()
            .unwrap_err();
        assert_eq!(
            joined.downcast_ref::<FatalError>().map(FatalError::message),
            Some("uncaught")
        );
    }

    #[test]
    fn checkpoint_resume_targets_innermost() {
        let outer = establish_checkpoint(|| {
            let inner: Outcome<()> =
                establish_checkpoint(|| CheckpointResume.raise("x".to_string()));
            inner.resumed_message().map(str::to_owned)
        });
        assert_eq!(outer, Outcome::Established(Some("x".to_string())));
    }
}
