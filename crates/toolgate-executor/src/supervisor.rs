//! Background worker supervisor.
//!
//! The gateway facade owns one supervisor. Each background concern (token
//! rotation sweep, key rotation, threat cleanup, rate-limit bucket GC) is
//! registered as a named periodic worker; the supervisor tracks its
//! [`tokio::task::JoinHandle`] and a [`CancellationToken`] scoped to it so
//! shutdown can signal every worker at once and wait for them to finish
//! within a bound.

use crate::Executor;
use parking_lot::Mutex;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[cfg(feature = "metrics")]
use metrics::counter;

struct Worker {
    name: String,
    handle: JoinHandle<()>,
}

/// Tracks and shuts down the gateway's background workers.
///
/// Signaling and joining workers is step 2 and step 4 of the shutdown
/// sequence; stopping admission and draining the bulkhead (steps 1 and 3)
/// are the facade's own responsibility and happen around a call to
/// [`WorkerSupervisor::shutdown`].
pub struct WorkerSupervisor {
    root_cancel: CancellationToken,
    workers: Mutex<Vec<Worker>>,
}

impl WorkerSupervisor {
    /// Creates an empty supervisor.
    pub fn new() -> Self {
        Self {
            root_cancel: CancellationToken::new(),
            workers: Mutex::new(Vec::new()),
        }
    }

    /// Registers a worker that runs `tick` every `interval` until shutdown.
    ///
    /// The first tick fires after the first `interval` elapses, not
    /// immediately on registration.
    pub fn spawn_periodic<E, F, Fut>(
        &self,
        executor: &E,
        name: impl Into<String>,
        interval: Duration,
        mut tick: F,
    ) where
        E: Executor,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let cancel = self.root_cancel.child_token();
        let worker_name = name.clone();

        let handle = executor.spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(worker = %worker_name, "worker cancelled");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        tick().await;
                    }
                }
            }
        });

        self.workers.lock().push(Worker { name, handle });
    }

    /// Cancels every registered worker and waits up to `join_timeout` for
    /// each to finish, aborting any that are still running afterward.
    pub async fn shutdown(&self, join_timeout: Duration) {
        self.root_cancel.cancel();

        let workers: Vec<Worker> = self.workers.lock().drain(..).collect();
        for mut worker in workers {
            match tokio::time::timeout(join_timeout, &mut worker.handle).await {
                Ok(Ok(())) => {
                    #[cfg(feature = "metrics")]
                    counter!("executor_worker_shutdown_total", "worker" => worker.name, "outcome" => "joined")
                        .increment(1);
                }
                Ok(Err(join_err)) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(worker = %worker.name, error = %join_err, "worker task ended with an error");
                }
                Err(_) => {
                    worker.handle.abort();
                    #[cfg(feature = "tracing")]
                    tracing::warn!(worker = %worker.name, "worker did not shut down within timeout, aborting");
                    #[cfg(feature = "metrics")]
                    counter!("executor_worker_shutdown_total", "worker" => worker.name, "outcome" => "aborted")
                        .increment(1);
                }
            }
        }
    }

    /// Number of workers currently registered (including any that have
    /// already finished but not yet been reaped by `shutdown`).
    pub fn worker_count(&self) -> usize {
        self.workers.lock().len()
    }
}

impl Default for WorkerSupervisor {
    fn default() -> Self {
        Self::new()
    }
}
