//! Per-thread stack of active recovery points.
//!
//! Every thread owns an independent `ContextStack` in thread-local
//! storage, so there is nothing to lock: a checkpoint established on one
//! thread is never visible to another.
//!
//! The stack owns each `ErrorContext`; the frame that established it
//! holds only its [`ContextToken`]. Push and pop are crate-private and are
//! driven exclusively by the checkpoint guard, which keeps nesting in
//! lexical order.

use std::cell::RefCell;
use std::fmt;
use tracing::warn;
use trap_common::consts::CHECKPOINT_STACK_RESERVE;

use crate::signal::report_and_abort;

/// Opaque identity of one established recovery point.
///
/// Tokens increase monotonically per thread and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextToken(u64);

impl fmt::Display for ContextToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cp#{}", self.0)
    }
}

/// A recovery point: its token plus the message slot a signal fills in.
#[derive(Debug)]
pub(crate) struct ErrorContext {
    token: ContextToken,
    message: Option<String>,
}

/// LIFO of active recovery points; top is the innermost.
#[derive(Debug)]
pub(crate) struct ContextStack {
    records: Vec<ErrorContext>,
    next_token: u64,
}

impl ContextStack {
    fn new() -> Self {
        Self {
            records: Vec::with_capacity(CHECKPOINT_STACK_RESERVE),
            next_token: 0,
        }
    }

    fn push(&mut self) -> ContextToken {
        let token = ContextToken(self.next_token);
        self.next_token += 1;
        self.records.push(ErrorContext {
            token,
            message: None,
        });
        token
    }

    fn pop(&mut self, token: ContextToken) -> ErrorContext {
        match self.records.pop() {
            Some(record) if record.token == token => record,
            Some(_) => report_and_abort("checkpoint released out of lexical order", false),
            None => report_and_abort("checkpoint stack underflow", false),
        }
    }

    fn peek(&self) -> Option<ContextToken> {
        self.records.last().map(|r| r.token)
    }

    fn depth(&self) -> usize {
        self.records.len()
    }
}

thread_local! {
    static STACK: RefCell<ContextStack> = RefCell::new(ContextStack::new());
}

/// Push a fresh recovery point for the calling thread.
pub(crate) fn push() -> ContextToken {
    STACK.with_borrow_mut(ContextStack::push)
}

/// Pop the innermost recovery point. Aborts if it is not `token`'s.
pub(crate) fn pop(token: ContextToken) -> ErrorContext {
    STACK.with_borrow_mut(|stack| stack.pop(token))
}

/// Write `message` into the innermost slot.
///
/// Returns the targeted token, or gives the message back when the thread
/// has no recovery point.
pub(crate) fn deposit(message: String) -> Result<ContextToken, String> {
    STACK.with_borrow_mut(|stack| match stack.records.last_mut() {
        Some(top) => {
            if let Some(stale) = top.message.replace(message) {
                warn!(token = %top.token, %stale, "overwriting undelivered fatal error");
            }
            Ok(top.token)
        }
        None => Err(message),
    })
}

/// Take the message deposited for `token`, if `token` is the innermost.
pub(crate) fn take_message(token: ContextToken) -> Option<String> {
    STACK.with_borrow_mut(|stack| match stack.records.last_mut() {
        Some(top) if top.token == token => top.message.take(),
        _ => None,
    })
}

/// Innermost recovery point of the calling thread.
pub fn innermost() -> Option<ContextToken> {
    STACK.with_borrow(ContextStack::peek)
}

/// Number of recovery points active on the calling thread.
pub fn depth() -> usize {
    STACK.with_borrow(ContextStack::depth)
}
