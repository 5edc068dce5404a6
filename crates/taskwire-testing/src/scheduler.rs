//! Control over when a stub response reaches the caller.
//!
//! Every scheduler hands back exactly the response its work produced. They
//! differ only in timing:
//!
//! - [`ImmediateScheduler`] returns as soon as the work completes
//! - [`DelayedScheduler`] sleeps for a configurable duration first
//! - [`SuspendedScheduler`] parks callers until [`SuspendedScheduler::resume`]

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::future::BoxFuture;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;
use taskwire_core::{Error, HttpResponse};
use tokio::sync::oneshot;

/// Work handed to a scheduler
pub type ResponseFuture = BoxFuture<'static, HttpResponse<Bytes>>;

#[async_trait]
pub trait ResponseScheduler: Send + Sync {
    async fn schedule(&self, work: ResponseFuture) -> HttpResponse<Bytes>;
}

/// Delivers responses as soon as they are produced
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateScheduler;

impl ImmediateScheduler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ResponseScheduler for ImmediateScheduler {
    async fn schedule(&self, work: ResponseFuture) -> HttpResponse<Bytes> {
        work.await
    }
}

/// Delays delivery by a fixed duration
///
/// Without a delay it behaves like [`ImmediateScheduler`]. The delay can be
/// changed while requests are in flight; calls already sleeping keep the
/// value they read. Dropping the caller's future cancels the sleep.
#[derive(Debug, Default)]
pub struct DelayedScheduler {
    delay: RwLock<Option<Duration>>,
}

impl DelayedScheduler {
    pub fn new(delay: Option<Duration>) -> Self {
        Self {
            delay: RwLock::new(delay),
        }
    }

    pub fn delay(&self) -> Option<Duration> {
        *self.delay.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.write().unwrap_or_else(PoisonError::into_inner) = delay;
    }
}

#[async_trait]
impl ResponseScheduler for DelayedScheduler {
    async fn schedule(&self, work: ResponseFuture) -> HttpResponse<Bytes> {
        if let Some(delay) = self.delay() {
            tracing::trace!(delay_ms = delay.as_millis() as u64, "delaying stub response");
            tokio::time::sleep(delay).await;
        }
        work.await
    }
}

/// Holds every response until the test releases it
///
/// The work runs right away; only delivery waits. [`resume`] releases all
/// parked callers in the order they arrived, which lets a test pin down the
/// interleaving of concurrent requests.
///
/// [`resume`]: SuspendedScheduler::resume
#[derive(Debug, Default)]
pub struct SuspendedScheduler {
    waiting: Mutex<VecDeque<oneshot::Sender<()>>>,
}

impl SuspendedScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<oneshot::Sender<()>>> {
        self.waiting.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Release every parked caller, oldest first. Returns how many were
    /// released.
    pub fn resume(&self) -> usize {
        let waiting: Vec<_> = self.queue().drain(..).collect();
        let mut released = 0;
        for sender in waiting {
            // A receiver is gone when its caller stopped waiting.
            if sender.send(()).is_ok() {
                released += 1;
            }
        }
        tracing::trace!(released, "resumed suspended responses");
        released
    }

    /// Number of callers currently parked
    pub fn pending(&self) -> usize {
        self.queue().len()
    }

    /// Abandon every parked caller. Each observes [`Error::Cancelled`].
    pub fn cancel(&self) -> usize {
        let waiting = std::mem::take(&mut *self.queue());
        tracing::trace!(cancelled = waiting.len(), "cancelled suspended responses");
        waiting.len()
    }
}

#[async_trait]
impl ResponseScheduler for SuspendedScheduler {
    async fn schedule(&self, work: ResponseFuture) -> HttpResponse<Bytes> {
        let response = work.await;
        let (sender, receiver) = oneshot::channel();
        self.queue().push_back(sender);
        tracing::trace!("suspending stub response");

        match receiver.await {
            Ok(()) => response,
            Err(_) => HttpResponse::failure(None, Error::Cancelled),
        }
    }
}
