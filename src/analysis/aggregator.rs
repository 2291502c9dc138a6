//! Result aggregation and ranking.
//!
//! This module turns the completed tasks in the store into a ranking
//! ordered by score.

use crate::models::{AnalysisResult, CriterionScore, Task, TaskId, TaskStatus};
use crate::report;
use serde::Serialize;
use std::cmp::Ordering;

/// One row of the ranking.
///
/// `repo_url` repeats `subject` under the name the web frontend reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub task_id: TaskId,
    pub subject: String,
    pub repo_url: String,
    pub total_score: Option<f64>,
    pub criteria: Vec<CriterionScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
}

impl RankingEntry {
    fn from_task(task: &Task) -> Self {
        let result = task.result();
        Self {
            task_id: task.id(),
            subject: task.subject().to_string(),
            repo_url: task.subject().to_string(),
            total_score: result.and_then(AnalysisResult::total_score),
            criteria: result.map(|r| r.criteria().to_vec()).unwrap_or_default(),
            report: result.map(|r| report::render_result(task.subject(), r)),
        }
    }

    /// Score used for ordering; an absent score counts as zero.
    fn sort_key(&self) -> f64 {
        self.total_score.unwrap_or(0.0)
    }
}

/// Rank successful tasks by score, highest first.
///
/// `tasks` must be in insertion order: the sort is stable, so equal scores
/// keep their submission order.
pub fn rank(tasks: &[Task]) -> Vec<RankingEntry> {
    let mut entries: Vec<RankingEntry> = tasks
        .iter()
        .filter(|task| task.status() == TaskStatus::Success)
        .map(RankingEntry::from_task)
        .collect();

    entries.sort_by(|a, b| compare_desc(a.sort_key(), b.sort_key()));
    entries
}

fn compare_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
