//! Analysis modules.
//!
//! An [`Analyzer`] turns a subject into an [`AnalysisResult`]; the
//! [`orchestrator`] drives it through the task lifecycle and records the
//! outcome in the store.

pub mod aggregator;
pub mod extract;
pub mod orchestrator;
pub mod readme;
pub mod rubric;

pub use aggregator::{rank, RankingEntry};
pub use orchestrator::Orchestrator;
pub use readme::{ReadmeAnalyzer, ReadmeSettings};
pub use rubric::RubricAnalyzer;

use crate::error::AnalysisError;
use crate::models::{AnalysisResult, TaskId};
use crate::store::TaskStore;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// Produces a verdict for one subject.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Analyze `subject`, reporting intermediate steps through `progress`.
    async fn analyze(
        &self,
        subject: &str,
        progress: &ProgressReporter,
    ) -> Result<AnalysisResult, AnalysisError>;

    /// Message recorded when the task moves to IN_PROGRESS.
    fn initial_message(&self) -> &'static str;
}

/// Writes progress messages onto a running task.
pub struct ProgressReporter {
    store: Arc<dyn TaskStore>,
    task_id: TaskId,
}

impl ProgressReporter {
    pub fn new(store: Arc<dyn TaskStore>, task_id: TaskId) -> Self {
        Self { store, task_id }
    }

    /// Replace the task's message. Ignored, with a warning, if the task is no longer running.
    pub fn report(&self, message: &str) {
        if let Err(e) = self
            .store
            .update(&self.task_id, &mut |task| task.report_progress(message))
        {
            warn!(task_id = %self.task_id, error = %e, "could not record progress");
        }
    }
}
