//! Tracked background work that must not outlive shutdown.

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Spawner for fire-and-forget work (late webhook writes, approval
/// notifications).
///
/// Every task races the process-wide [`CancellationToken`]; shutdown
/// cancels the token and waits for the tracker to drain.
#[derive(Clone)]
pub struct BackgroundTasks {
    tracker: TaskTracker,
    cancel: CancellationToken,
}

impl BackgroundTasks {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            tracker: TaskTracker::new(),
            cancel,
        }
    }

    /// Spawn `task`, dropping it if shutdown begins first.
    pub fn spawn<F>(&self, name: &'static str, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let cancel = self.cancel.clone();
        self.tracker.spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(task = name, "Background task cancelled by shutdown");
                }
                _ = task => {}
            }
        });
    }

    /// Number of tasks still running.
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for every running task to finish on its own.
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Cancel outstanding tasks and wait for them to unwind.
    pub async fn shutdown(&self) {
        let pending = self.pending();
        self.cancel.cancel();
        self.tracker.close();
        self.tracker.wait().await;
        tracing::info!(pending, "Background tasks stopped");
    }
}
