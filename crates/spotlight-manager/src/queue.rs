//! Work queues that run index mutations off the caller's thread.
//!
//! Jobs on a [`BackgroundQueue`] run concurrently, so an add followed closely
//! by a delete of the same record may land in either order. Call
//! [`BackgroundQueue::wait_idle`] between them, or use [`InlineQueue`], when
//! order matters.
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio_util::task::TaskTracker;

use spotlight_core::config::QueueConfig;
use spotlight_core::error::{Error, Result};
use spotlight_core::traits::{Job, WorkQueue};

/// A pool of background threads owned by a private tokio runtime.
pub struct BackgroundQueue {
    runtime: Mutex<Option<Runtime>>,
    handle: Handle,
    tracker: TaskTracker,
    accepting: AtomicBool,
    idle: Mutex<()>,
}

impl BackgroundQueue {
    pub fn new(config: &QueueConfig) -> anyhow::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(config.worker_threads)
            .max_blocking_threads(config.worker_threads)
            .thread_name(config.thread_name.clone())
            .enable_all()
            .build()?;
        let handle = runtime.handle().clone();
        tracing::debug!(workers = config.worker_threads, name = %config.thread_name, "Started background queue");
        Ok(Self {
            runtime: Mutex::new(Some(runtime)),
            handle,
            tracker: TaskTracker::new(),
            accepting: AtomicBool::new(true),
            idle: Mutex::new(()),
        })
    }

    pub fn try_submit(&self, job: Job) -> Result<()> {
        if !self.accepting.load(Ordering::SeqCst) {
            return Err(Error::QueueClosed);
        }
        self.tracker.spawn_blocking_on(job, &self.handle);
        Ok(())
    }

    /// Jobs submitted but not yet finished.
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    pub fn is_running(&self) -> bool {
        self.accepting.load(Ordering::SeqCst)
    }

    /// Block until every job submitted so far has finished.
    ///
    /// Must not be called from inside a job or an async context.
    pub fn wait_idle(&self) {
        let _guard = self.idle.lock();
        if !self.is_running() {
            return;
        }
        self.tracker.close();
        self.handle.block_on(self.tracker.wait());
        if self.is_running() {
            self.tracker.reopen();
        }
    }

    /// Stop accepting jobs, give running ones up to `timeout` to finish, and
    /// tear down the worker threads. Returns `true` if every job finished.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        self.accepting.store(false, Ordering::SeqCst);
        // Wait out any in-flight `wait_idle` so it cannot reopen the tracker.
        let _guard = self.idle.lock();
        let Some(runtime) = self.runtime.lock().take() else {
            return true;
        };
        self.tracker.close();
        let tracker = self.tracker.clone();
        let drained = runtime.block_on(async move { tokio::time::timeout(timeout, tracker.wait()).await.is_ok() });
        if !drained {
            tracing::warn!(pending = self.tracker.len(), "Background queue shut down with jobs still running");
        }
        runtime.shutdown_timeout(timeout);
        drained
    }
}

impl WorkQueue for BackgroundQueue {
    fn submit(&self, job: Job) {
        if let Err(e) = self.try_submit(job) {
            tracing::warn!("Dropping job: {}", e);
        }
    }
}

impl Drop for BackgroundQueue {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.lock().take() {
            let pending = self.tracker.len();
            if pending > 0 {
                tracing::warn!(pending, "Background queue dropped without shutdown; abandoning unfinished jobs");
            }
            runtime.shutdown_background();
        }
    }
}

/// Runs each job on the submitting thread, in submission order.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineQueue;

impl WorkQueue for InlineQueue {
    fn submit(&self, job: Job) {
        job();
    }
}
