//! # Trap Core
//!
//! Fatal-error propagation for code that has to run on hosts with very
//! different failure semantics: normal unwinding, builds where unwinding is
//! unwanted or unavailable, and hosts where the only acceptable reaction is
//! to terminate.
//!
//! Deeply nested code reports an unrecoverable condition with [`signal`] (or
//! the [`fatal!`] macro). A small number of call sites establish a recovery
//! point with [`establish_checkpoint`] and receive the message back as
//! [`Outcome::Resumed`]. Which of the three terminal behaviours applies is a
//! process-wide [`Mode`]:
//!
//! | Mode | `signal` behaviour |
//! |------|--------------------|
//! | [`Mode::Abort`] | diagnostic on stderr (debug builds), then abort |
//! | [`Mode::CheckpointResume`] | resume at the innermost checkpoint, else abort |
//! | [`Mode::Exception`] | raise a [`FatalError`] through native unwinding |
//!
//! # Module Structure
//!
//! - [`context`] - Per-thread stack of active recovery points
//! - [`checkpoint`] - Establishing, resuming and clearing recovery points
//! - [`signal`] - The fatal-error entry point
//! - [`mode`] - Strategy implementations and process-wide mode selection
//! - [`error`] - Error types
//!
//! # Example
//!
//! ```rust
//! use trap_core::{establish_checkpoint, fatal, Outcome};
//!
//! fn lower(depth: u32) -> u32 {
//!     if depth == 0 {
//!         fatal!("unsupported construct at depth {}", depth);
//!     }
//!     lower(depth - 1) + 1
//! }
//!
//! match establish_checkpoint(|| lower(3)) {
//!     Outcome::Established(v) => println!("lowered: {v}"),
//!     Outcome::Resumed(message) => println!("compile failed: {message}"),
//! }
//! ```

#![deny(missing_docs)]

pub mod checkpoint;
pub mod context;
pub mod error;
pub mod mode;
pub mod signal;

pub use crate::checkpoint::{Outcome, catch_fatal, establish_checkpoint};
pub use crate::error::{FatalError, ModeError};
pub use crate::mode::{AbortOnly, CheckpointResume, FatalStrategy, NativeException};
pub use crate::signal::signal;
pub use trap_common::mode::Mode;

/// Signal a fatal error with a formatted message.
///
/// Shorthand for `signal(format!(...))`. Never returns.
///
/// ```rust
/// use trap_core::{catch_fatal, fatal};
///
/// let err = catch_fatal(|| -> u32 { fatal!("bad opcode {:#x}", 0xfe) }).unwrap_err();
/// assert_eq!(err.message(), "bad opcode 0xfe");
/// ```
#[macro_export]
macro_rules! fatal {
    ($($arg:tt)*) => {
        $crate::signal(::std::format!($($arg)*))
    };
}
