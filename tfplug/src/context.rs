//! Context implementation for request-scoped cancellation and deadlines
//!
//! This module provides the Context type which carries the cancellation
//! signal and deadline of one host request across async boundaries.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time;

/// Context carries request-scoped cancellation signals and timeouts
/// CRITICAL: Pass this as first parameter to ALL async trait methods
/// This enables proper cancellation and timeout handling
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    deadline: Option<Instant>,
    done_tx: watch::Sender<bool>,
}

impl Context {
    pub fn new() -> Self {
        let (done_tx, _) = watch::channel(false);

        Self {
            inner: Arc::new(ContextInner {
                deadline: None,
                done_tx,
            }),
        }
    }

    /// Derives a context that is cancelled when the timeout elapses or when
    /// this context is cancelled, whichever comes first. Must be called
    /// inside a tokio runtime.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.inner.deadline {
            Some(existing) if existing < candidate => existing,
            _ => candidate,
        };

        let (done_tx, _) = watch::channel(self.is_cancelled());
        let child_tx = done_tx.clone();
        let parent = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = time::sleep_until(deadline.into()) => {}
                _ = parent.cancelled() => {}
            }
            child_tx.send_replace(true);
        });

        Self {
            inner: Arc::new(ContextInner {
                deadline: Some(deadline),
                done_tx,
            }),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.done_tx.borrow()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Time left before the deadline, None when there is no deadline
    pub fn remaining(&self) -> Option<Duration> {
        self.inner
            .deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Resolves once this context is cancelled
    pub async fn cancelled(&self) {
        let mut rx = self.inner.done_tx.subscribe();
        let _ = rx.wait_for(|done| *done).await;
    }

    /// Returns a channel that flips to true when work done on behalf of
    /// this context should be cancelled
    pub fn done(&self) -> watch::Receiver<bool> {
        self.inner.done_tx.subscribe()
    }

    pub fn cancel(&self) {
        self.inner.done_tx.send_replace(true);
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
