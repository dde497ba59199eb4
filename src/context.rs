//! Cancellation contexts
//!
//! Every store operation takes a [`Context`]. It is checked before a
//! transaction begins, while waiting for the writer lock and between cursor
//! steps. Once a commit has started writing it is no longer consulted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{Result, StoreError};

/// A cancellable, optionally deadline-bound scope for store operations
///
/// Cloning is cheap and clones share cancellation state. Derived contexts
/// observe their ancestors: cancelling a parent cancels every child, while
/// cancelling a child leaves the parent untouched.
#[derive(Debug, Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

#[derive(Debug)]
struct ContextInner {
    cancelled: AtomicBool,
    deadline: Option<Instant>,
    parent: Option<Context>,
}

impl Context {
    /// A context that is never cancelled and has no deadline
    pub fn background() -> Self {
        Self::derive(None, None)
    }

    /// Derive a child that can be cancelled independently
    pub fn with_cancel(&self) -> Self {
        Self::derive(Some(self.clone()), None)
    }

    /// Derive a child that expires `timeout` from now
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a child that expires at `deadline`
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        Self::derive(Some(self.clone()), Some(deadline))
    }

    fn derive(parent: Option<Context>, deadline: Option<Instant>) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                cancelled: AtomicBool::new(false),
                deadline,
                parent,
            }),
        }
    }

    /// Cancel this context and everything derived from it
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
    }

    /// Earliest deadline along the ancestor chain
    pub fn deadline(&self) -> Option<Instant> {
        let own = self.inner.deadline;
        let inherited = self.inner.parent.as_ref().and_then(Context::deadline);
        match (own, inherited) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Time left before the deadline, `None` when there is no deadline
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline()
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
            || self.inner.parent.as_ref().is_some_and(Context::is_cancelled)
    }

    /// True once the context is cancelled or past its deadline
    pub fn is_done(&self) -> bool {
        self.check().is_err()
    }

    /// `Err(Cancelled)` or `Err(DeadlineExceeded)` once the context is done
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        match self.deadline() {
            Some(deadline) if Instant::now() >= deadline => Err(StoreError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}
