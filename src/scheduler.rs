//! Background work scheduling.
//!
//! Each submission becomes one independent tokio task tracked in a
//! [`JoinSet`], so shutdown can wait for in-flight analyses instead of
//! dropping them on the floor.

use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Spawns and tracks units of work.
#[derive(Debug, Default)]
pub struct Scheduler {
    tasks: Mutex<JoinSet<()>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `work` in the background. Must be called from within a tokio runtime.
    pub fn spawn<F>(&self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.lock();
        // Reap finished work so the set does not grow for the process lifetime.
        while let Some(finished) = tasks.try_join_next() {
            log_join_result(finished);
        }
        tasks.spawn(work);
    }

    /// Number of units of work not yet reaped.
    pub fn in_flight(&self) -> usize {
        let mut tasks = self.lock();
        while let Some(finished) = tasks.try_join_next() {
            log_join_result(finished);
        }
        tasks.len()
    }

    /// Wait up to `grace` for all scheduled work to finish, then abort the rest.
    ///
    /// Returns the number of units of work that had to be aborted.
    pub async fn drain(&self, grace: Duration) -> usize {
        let mut tasks = std::mem::take(&mut *self.lock());
        if tasks.is_empty() {
            return 0;
        }

        info!(in_flight = tasks.len(), grace_seconds = grace.as_secs(), "draining scheduled work");
        let joined = tokio::time::timeout(grace, async {
            while let Some(finished) = tasks.join_next().await {
                log_join_result(finished);
            }
        })
        .await;

        if joined.is_ok() {
            return 0;
        }

        let abandoned = tasks.len();
        warn!(abandoned, "grace period elapsed; aborting remaining work");
        tasks.shutdown().await;
        abandoned
    }
}

fn log_join_result(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        if e.is_panic() {
            error!(error = %e, "background analysis panicked");
        } else {
            warn!(error = %e, "background analysis was cancelled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_drain_waits_for_all_work() {
        let scheduler = Scheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            let counter = Arc::clone(&counter);
            scheduler.spawn(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        assert_eq!(scheduler.drain(Duration::from_secs(5)).await, 0);
        assert_eq!(counter.load(Ordering::SeqCst), 5);
        assert_eq!(scheduler.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_drain_aborts_after_grace_period() {
        let scheduler = Scheduler::new();
        scheduler.spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        let abandoned = scheduler.drain(Duration::from_millis(20)).await;
        assert_eq!(abandoned, 1);
    }

    #[tokio::test]
    async fn test_drain_with_nothing_scheduled() {
        let scheduler = Scheduler::new();
        assert_eq!(scheduler.drain(Duration::from_millis(1)).await, 0);
    }

    #[tokio::test]
    async fn test_panicking_work_does_not_poison_scheduler() {
        let scheduler = Scheduler::new();
        scheduler.spawn(async { panic!("boom") });
        scheduler.drain(Duration::from_secs(1)).await;

        scheduler.spawn(async {});
        assert_eq!(scheduler.drain(Duration::from_secs(1)).await, 0);
    }

    #[tokio::test]
    async fn test_in_flight_counts_running_work() {
        let scheduler = Scheduler::new();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        scheduler.spawn(async move {
            let _ = rx.await;
        });

        assert_eq!(scheduler.in_flight(), 1);
        tx.send(()).unwrap();
        scheduler.drain(Duration::from_secs(1)).await;
        assert_eq!(scheduler.in_flight(), 0);
    }
}
