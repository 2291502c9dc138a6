//! Task orchestration.
//!
//! Drives one task from PENDING to a terminal state:
//!
//! ```text
//! PENDING -> IN_PROGRESS -> SUCCESS
//!                        -> FAILURE (transport, model, extraction, timeout or panic)
//! ```
//!
//! Errors are caught here and written to the task's message; nothing
//! escapes the unit of work and nothing is retried.

use super::{Analyzer, ProgressReporter};
use crate::models::{Task, TaskId};
use crate::scheduler::Scheduler;
use crate::store::TaskStore;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// Message recorded on successful completion.
pub const DONE_MESSAGE: &str = "done";

/// Holds back a scheduled analysis until it is released or dropped.
///
/// The HTTP layer keeps the gate alive until the submission response has
/// been written, so the work always starts after the request completes.
#[derive(Debug)]
pub struct StartGate(#[allow(dead_code)] oneshot::Sender<()>);

/// Owns the task lifecycle for one analyzer.
pub struct Orchestrator {
    store: Arc<dyn TaskStore>,
    analyzer: Arc<dyn Analyzer>,
    task_timeout: Duration,
}

impl Orchestrator {
    pub fn new(store: Arc<dyn TaskStore>, analyzer: Arc<dyn Analyzer>, task_timeout: Duration) -> Self {
        Self {
            store,
            analyzer,
            task_timeout,
        }
    }

    pub fn store(&self) -> &Arc<dyn TaskStore> {
        &self.store
    }

    /// Create a PENDING task for `subject` and schedule its analysis.
    ///
    /// The work does not start before the returned gate is dropped. The
    /// task is the snapshot taken before anything was scheduled.
    pub fn submit(self: &Arc<Self>, scheduler: &Scheduler, subject: &str) -> (Task, StartGate) {
        let task = self.store.create(subject);
        let task_id = task.id();
        let orchestrator = Arc::clone(self);
        let (release, gate) = oneshot::channel::<()>();

        scheduler.spawn(async move {
            // Dropping the sender is the release signal.
            let _ = gate.await;
            orchestrator.run(task_id).await;
        });

        info!(task_id = %task_id, subject, "analysis scheduled");
        (task, StartGate(release))
    }

    /// Run the analysis for an existing task to a terminal state.
    pub async fn run(&self, task_id: TaskId) {
        let Some(task) = self.store.get(&task_id) else {
            warn!(task_id = %task_id, "scheduled task disappeared from the store");
            return;
        };
        if task.status().is_terminal() {
            debug!(task_id = %task_id, status = %task.status(), "task already finished");
            return;
        }
        let subject = task.subject().to_string();

        let initial_message = self.analyzer.initial_message();
        if let Err(e) = self
            .store
            .update(&task_id, &mut |t| t.start(initial_message))
        {
            warn!(task_id = %task_id, error = %e, "could not start task");
            return;
        }
        debug!(task_id = %task_id, subject = %subject, "analysis started");

        let progress = ProgressReporter::new(Arc::clone(&self.store), task_id);
        let analysis = AssertUnwindSafe(self.analyzer.analyze(&subject, &progress)).catch_unwind();
        let outcome = match tokio::time::timeout(self.task_timeout, analysis).await {
            Ok(Ok(result)) => result.map_err(|e| e.to_string()),
            Ok(Err(panic)) => {
                let reason = panic_reason(panic.as_ref());
                error!(task_id = %task_id, subject = %subject, reason = %reason, "analyzer panicked");
                Err(format!("analyzer panicked: {}", reason))
            }
            Err(_) => Err(format!(
                "analysis timed out after {}s",
                self.task_timeout.as_secs()
            )),
        };

        let committed = match outcome {
            Ok(result) => {
                let score = result.total_score();
                let committed = self
                    .store
                    .update(&task_id, &mut |t| t.succeed(result.clone(), DONE_MESSAGE));
                info!(task_id = %task_id, subject = %subject, score = ?score, "analysis completed");
                committed
            }
            Err(message) => {
                warn!(task_id = %task_id, subject = %subject, error = %message, "analysis failed");
                let message = format!("analysis failed: {}", message);
                self.store
                    .update(&task_id, &mut |t| t.fail(message.clone()))
            }
        };

        if let Err(e) = committed {
            warn!(task_id = %task_id, error = %e, "could not record analysis outcome");
        }
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
