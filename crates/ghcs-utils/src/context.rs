//! Cancellation and deadline propagation for long-running operations.
//!
//! A [`Context`] is cheap to clone and forms a tree: cancelling a parent
//! cancels every child, and a child's deadline is never later than its
//! parent's. Waiting on [`Context::done`] inside a `tokio::select!` is how
//! polling loops observe interruption.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::time::Instant;

/// Why a context finished.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    #[error("context canceled")]
    Canceled,
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

type DoneFuture<'a> = Pin<Box<dyn Future<Output = ContextError> + Send + 'a>>;

struct Inner {
    canceled: watch::Sender<bool>,
    parent: Option<Context>,
    deadline: Option<Instant>,
}

/// Cancellation scope handed to every blocking operation.
#[derive(Clone)]
pub struct Context {
    inner: Arc<Inner>,
}

/// Cancels the [`Context`] it was created with, and all of that context's children.
#[derive(Clone)]
pub struct CancelHandle {
    inner: Arc<Inner>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.inner.canceled.send_replace(true);
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("deadline", &self.deadline())
            .field("err", &self.err())
            .finish()
    }
}

impl Context {
    /// A root context that is never canceled and has no deadline.
    #[must_use]
    pub fn background() -> Self {
        Self::new(None, None)
    }

    fn new(parent: Option<Context>, deadline: Option<Instant>) -> Self {
        let (canceled, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                canceled,
                parent,
                deadline,
            }),
        }
    }

    /// Child context plus the handle that cancels it.
    #[must_use]
    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        let child = Self::new(Some(self.clone()), self.deadline());
        let handle = CancelHandle {
            inner: Arc::clone(&child.inner),
        };
        (child, handle)
    }

    /// Child context that finishes with [`ContextError::DeadlineExceeded`] after `timeout`.
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    #[must_use]
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let effective = match self.deadline() {
            Some(parent) if parent < deadline => parent,
            _ => deadline,
        };
        Self::new(Some(self.clone()), Some(effective))
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Non-blocking check. Cancellation wins over an expired deadline.
    #[must_use]
    pub fn err(&self) -> Option<ContextError> {
        if *self.inner.canceled.borrow() {
            return Some(ContextError::Canceled);
        }
        if let Some(parent) = &self.inner.parent
            && let Some(err) = parent.err()
        {
            return Some(err);
        }
        match self.inner.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Resolves once this context or any ancestor is canceled or its deadline passes.
    pub fn done(&self) -> DoneFuture<'_> {
        Box::pin(async move {
            if let Some(err) = self.err() {
                return err;
            }

            let mut rx = self.inner.canceled.subscribe();
            let own = async move {
                // The sender lives as long as `self`, so this only returns on cancel.
                let _ = rx.wait_for(|canceled| *canceled).await;
                ContextError::Canceled
            };
            let parent = async {
                match &self.inner.parent {
                    Some(parent) => parent.done().await,
                    None => std::future::pending().await,
                }
            };
            let deadline = async {
                match self.inner.deadline {
                    Some(deadline) => {
                        tokio::time::sleep_until(deadline).await;
                        ContextError::DeadlineExceeded
                    }
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                err = own => err,
                err = parent => err,
                err = deadline => err,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_background_never_finishes() {
        let ctx = Context::background();
        assert!(ctx.err().is_none());
        let res = tokio::time::timeout(Duration::from_millis(20), ctx.done()).await;
        assert!(res.is_err());
    }

    #[tokio::test]
    async fn test_cancel_resolves_done() {
        let (ctx, cancel) = Context::background().with_cancel();
        let waiter = {
            let ctx = ctx.clone();
            tokio::spawn(async move { ctx.done().await })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;
        cancel.cancel();
        assert_eq!(waiter.await.unwrap(), ContextError::Canceled);
        assert_eq!(ctx.err(), Some(ContextError::Canceled));
    }

    #[tokio::test]
    async fn test_parent_cancel_reaches_child() {
        let (parent, cancel) = Context::background().with_cancel();
        let child = parent.with_timeout(Duration::from_secs(60));
        cancel.cancel();
        assert_eq!(child.done().await, ContextError::Canceled);
    }

    #[tokio::test]
    async fn test_child_cancel_does_not_reach_parent() {
        let parent = Context::background();
        let (child, cancel) = parent.with_cancel();
        cancel.cancel();
        assert!(child.is_done());
        assert!(!parent.is_done());
    }

    #[tokio::test]
    async fn test_deadline_exceeded() {
        let ctx = Context::background().with_timeout(Duration::from_millis(10));
        assert_eq!(ctx.done().await, ContextError::DeadlineExceeded);
        assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
    }

    #[test]
    fn test_child_deadline_capped_by_parent() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let parent = Context::background().with_timeout(Duration::from_millis(50));
            let child = parent.with_timeout(Duration::from_secs(600));
            assert_eq!(child.deadline(), parent.deadline());
        });
    }
}
