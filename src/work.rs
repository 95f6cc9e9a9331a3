//! Single-consumer background work queues.
//!
//! # Data Flow
//! ```text
//! request handler ──append()──▶ pending buffer (mutex)
//!                                    │ notify
//!                                    ▼
//!                          dedicated worker task
//!                          swap buffer for empty one
//!                          consume items in order
//!                          failures → ErrorStack
//! ```
//!
//! # Design Decisions
//! - `append` never blocks on the worker; it locks, pushes, and signals
//! - The worker swaps the whole buffer out, so appends made mid-drain
//!   accumulate in a fresh buffer instead of blocking or getting lost
//! - A failing item is reported and skipped; the worker never stops
//! - No shutdown or consume timeout: queues live for the process lifetime,
//!   and a hung external command stalls that one worker until it exits

use futures_util::future::BoxFuture;
use std::fmt::Display;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Notify;

use crate::errors::ErrorStack;

/// Processing hook supplied by the subsystem that owns a queue.
///
/// `consume` is called once per appended job, in submission order, on the
/// queue's single worker task.
pub trait JobConsumer: Send + 'static {
    type Job: Send + 'static;
    type Error: Display + Send;

    fn consume(&mut self, job: Self::Job) -> BoxFuture<'_, Result<(), Self::Error>>;
}

struct Inner<T> {
    pending: Mutex<Vec<T>>,
    wake: Notify,
}

/// Handle to a background work queue.
///
/// Cloning the handle shares the same queue and worker; the worker task is
/// spawned once in [`WorkQueue::spawn`] and runs forever.
pub struct WorkQueue<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for WorkQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + 'static> WorkQueue<T> {
    /// Create a queue and spawn its dedicated worker.
    ///
    /// `name` identifies the queue in logs and error reports; consume
    /// failures are pushed onto `errors` and never reach any HTTP response.
    pub fn spawn<C>(name: impl Into<String>, consumer: C, errors: Arc<ErrorStack>) -> Self
    where
        C: JobConsumer<Job = T>,
    {
        let inner = Arc::new(Inner {
            pending: Mutex::new(Vec::new()),
            wake: Notify::new(),
        });
        tokio::spawn(worker_loop(Arc::clone(&inner), name.into(), consumer, errors));
        Self { inner }
    }

    /// Enqueue a job for asynchronous processing. Returns immediately.
    pub fn append(&self, job: T) {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(job);
        self.inner.wake.notify_one();
    }
}

async fn worker_loop<C: JobConsumer>(
    inner: Arc<Inner<C::Job>>,
    name: String,
    mut consumer: C,
    errors: Arc<ErrorStack>,
) {
    loop {
        inner.wake.notified().await;
        let batch = {
            let mut pending = inner
                .pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *pending)
        };
        for job in batch {
            if let Err(e) = consumer.consume(job).await {
                tracing::warn!(queue = %name, error = %e, "Background job failed");
                errors.report(&name, e.to_string());
            }
        }
    }
}
