//! Cancellable, deadline-aware handle for a unit of work.

use crate::error::LintError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    deadline: Option<Instant>,
    parent: Option<CancellationToken>,
}

/// Handle that signals when work should stop.
///
/// Clones share state. A token is cancelled once [`cancel`](Self::cancel)
/// is called on it (or any clone), once its deadline passes, or once any
/// ancestor is cancelled. Cancelling a child never affects its parent.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

impl CancellationToken {
    /// Creates a root token with no deadline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a root token that is cancelled at `deadline`.
    #[must_use]
    pub fn with_deadline(deadline: Instant) -> Self {
        Self::from_parts(Some(deadline), None)
    }

    /// Creates a root token that is cancelled after `timeout`.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Creates a child token observing this token's cancellation.
    #[must_use]
    pub fn child(&self) -> Self {
        Self::from_parts(None, Some(self.clone()))
    }

    /// Creates a child token that is additionally cancelled after `timeout`.
    #[must_use]
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        Self::from_parts(Some(Instant::now() + timeout), Some(self.clone()))
    }

    fn from_parts(deadline: Option<Instant>, parent: Option<Self>) -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                deadline,
                parent,
            }),
        }
    }

    /// Cancels this token and every token derived from it.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
    }

    /// Returns true once this token or an ancestor is cancelled or past its deadline.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        if self.inner.cancelled.load(Ordering::Acquire) {
            return true;
        }
        if self
            .inner
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
        {
            return true;
        }
        self.inner
            .parent
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    /// Returns the earliest deadline in this token's chain, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        let parent = self
            .inner
            .parent
            .as_ref()
            .and_then(CancellationToken::deadline);
        match (self.inner.deadline, parent) {
            (Some(own), Some(parent)) => Some(own.min(parent)),
            (own, parent) => own.or(parent),
        }
    }

    /// Returns an error once cancelled, for use with `?` in long-running work.
    ///
    /// # Errors
    ///
    /// Returns [`LintError::Cancelled`] if the token is cancelled.
    pub fn check(&self) -> Result<(), LintError> {
        if self.is_cancelled() {
            Err(LintError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_token_is_not_cancelled() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        assert!(token.deadline().is_none());
        assert!(token.check().is_ok());
    }

    #[test]
    fn cancel_is_shared_between_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
        assert_eq!(token.check(), Err(LintError::Cancelled));
    }

    #[test]
    fn parent_cancels_child_but_not_reverse() {
        let parent = CancellationToken::new();
        let child = parent.child();
        child.cancel();
        assert!(!parent.is_cancelled());

        let other = parent.child();
        parent.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn elapsed_deadline_cancels() {
        let token = CancellationToken::with_deadline(Instant::now());
        assert!(token.is_cancelled());
        assert!(token.child().is_cancelled());
    }

    #[test]
    fn deadline_is_earliest_in_chain() {
        let parent = CancellationToken::with_timeout(Duration::from_secs(60));
        let child = parent.child_with_timeout(Duration::from_secs(3600));
        assert_eq!(child.deadline(), parent.deadline());
        assert!(!child.is_cancelled());
    }
}
