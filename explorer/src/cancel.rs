//! Cooperative cancellation for long main-chain traversals.
//!
//! Traversal depth grows with the age of the queried unit, so callers hand
//! the resolver a [`CancelToken`] that is checked before every store probe.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::ExplorerError;

/// An optional deadline plus a shared cancellation flag.
///
/// Clones share the flag: cancelling any clone cancels them all.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// A token that never fires unless [`cancel`](Self::cancel) is called.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancelled: Arc::default(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// `Err` once the token was cancelled or its deadline passed.
    pub fn check(&self) -> Result<(), ExplorerError> {
        if self.is_cancelled() {
            return Err(ExplorerError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(ExplorerError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_passes() {
        assert!(CancelToken::new().check().is_ok());
        assert!(CancelToken::with_timeout(Duration::from_secs(60)).check().is_ok());
    }

    #[test]
    fn cancel_is_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(matches!(token.check(), Err(ExplorerError::Cancelled)));
    }

    #[test]
    fn past_deadline_fires() {
        let token = CancelToken::with_deadline(Instant::now());
        assert!(matches!(token.check(), Err(ExplorerError::DeadlineExceeded)));
    }
}
