//! Data models for the grading service.
//!
//! This module contains the task lifecycle record and the analysis
//! results it can carry once it succeeds.

use crate::analysis::rubric::Criterion;
use crate::error::TransitionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque task identifier, assigned once at submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Accepted, work not started yet.
    Pending,
    /// Work is running.
    InProgress,
    /// Finished with a result.
    Success,
    /// Finished without a result; `message` says why.
    Failure,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Success => "SUCCESS",
            TaskStatus::Failure => "FAILURE",
        }
    }

    /// Returns true for states with no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Success | TaskStatus::Failure)
    }

    /// Allowed edges: PENDING -> IN_PROGRESS -> {SUCCESS, FAILURE}, plus
    /// PENDING -> FAILURE for work that dies before it starts.
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Pending, TaskStatus::InProgress)
                | (TaskStatus::Pending, TaskStatus::Failure)
                | (TaskStatus::InProgress, TaskStatus::Success)
                | (TaskStatus::InProgress, TaskStatus::Failure)
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single-score verdict produced by the README analyzer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallScore {
    /// Repository the verdict is about, as echoed by the model.
    pub repo_url: String,
    /// Score on a 0.0 - 10.0 scale.
    pub overall_score: f64,
    /// Short justification.
    pub summary: String,
}

/// Score for one rubric criterion. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriterionScore {
    name: String,
    score: f64,
    justification: String,
}

impl CriterionScore {
    /// Build a score for `criterion`, rejecting values outside `0..=max`.
    pub fn new(
        criterion: Criterion,
        score: f64,
        justification: impl Into<String>,
    ) -> Result<Self, ScoreOutOfRange> {
        let max = criterion.max_score();
        if !(0.0..=max).contains(&score) {
            return Err(ScoreOutOfRange {
                criterion,
                score,
                max,
            });
        }

        Ok(Self {
            name: criterion.name().to_string(),
            score,
            justification: justification.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn justification(&self) -> &str {
        &self.justification
    }
}

/// A criterion score outside the rubric's range.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("score {score} for '{}' is outside 0..={max}", .criterion.name())]
pub struct ScoreOutOfRange {
    pub criterion: Criterion,
    pub score: f64,
    pub max: f64,
}

/// Multi-criterion verdict produced by the rubric analyzer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RubricReport {
    /// Sum of all criterion scores.
    pub total_score: f64,
    /// One entry per rubric criterion, in rubric order.
    pub criteria: Vec<CriterionScore>,
    /// Markdown report.
    pub report: String,
}

/// Outcome of a successful analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisResult {
    Overall(OverallScore),
    Rubric(RubricReport),
}

impl AnalysisResult {
    /// The score used for ranking.
    pub fn total_score(&self) -> Option<f64> {
        match self {
            AnalysisResult::Overall(o) => Some(o.overall_score),
            AnalysisResult::Rubric(r) => Some(r.total_score),
        }
    }

    /// Per-criterion breakdown; empty for single-score results.
    pub fn criteria(&self) -> &[CriterionScore] {
        match self {
            AnalysisResult::Overall(_) => &[],
            AnalysisResult::Rubric(r) => &r.criteria,
        }
    }
}

/// One submitted analysis request and its lifecycle.
///
/// Serializes as the snapshot returned by the HTTP API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    #[serde(rename = "task_id")]
    id: TaskId,
    subject: String,
    status: TaskStatus,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<AnalysisResult>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a fresh PENDING task for `subject`.
    pub fn new(subject: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::new(),
            subject: subject.into(),
            status: TaskStatus::Pending,
            message: "analysis scheduled".to_string(),
            result: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// PENDING -> IN_PROGRESS.
    pub fn start(&mut self, message: impl Into<String>) -> Result<(), TransitionError> {
        self.transition(TaskStatus::InProgress)?;
        self.message = message.into();
        Ok(())
    }

    /// Replace the progress message of a running task.
    pub fn report_progress(&mut self, message: impl Into<String>) -> Result<(), TransitionError> {
        if self.status != TaskStatus::InProgress {
            return Err(TransitionError {
                from: self.status,
                to: TaskStatus::InProgress,
            });
        }
        self.message = message.into();
        self.updated_at = Utc::now();
        Ok(())
    }

    /// IN_PROGRESS -> SUCCESS, attaching the result.
    pub fn succeed(
        &mut self,
        result: AnalysisResult,
        message: impl Into<String>,
    ) -> Result<(), TransitionError> {
        self.transition(TaskStatus::Success)?;
        self.result = Some(result);
        self.message = message.into();
        Ok(())
    }

    /// -> FAILURE. The result stays absent.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), TransitionError> {
        self.transition(TaskStatus::Failure)?;
        self.result = None;
        self.message = message.into();
        Ok(())
    }

    fn transition(&mut self, next: TaskStatus) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(TransitionError {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overall(score: f64) -> AnalysisResult {
        AnalysisResult::Overall(OverallScore {
            repo_url: "https://github.com/acme/widget".to_string(),
            overall_score: score,
            summary: "clear docs".to_string(),
        })
    }

    #[test]
    fn test_new_task_is_pending_without_result() {
        let task = Task::new("https://github.com/acme/widget");
        assert_eq!(task.status(), TaskStatus::Pending);
        assert!(task.result().is_none());
        assert!(!task.message().is_empty());
    }

    #[test]
    fn test_task_ids_are_unique() {
        let a = Task::new("x");
        let b = Task::new("x");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut task = Task::new("x");
        task.start("fetching documentation").unwrap();
        assert_eq!(task.status(), TaskStatus::InProgress);

        task.report_progress("invoking model").unwrap();
        assert_eq!(task.message(), "invoking model");

        task.succeed(overall(7.5), "done").unwrap();
        assert_eq!(task.status(), TaskStatus::Success);
        assert_eq!(task.result(), Some(&overall(7.5)));
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut task = Task::new("x");
        task.start("working").unwrap();
        task.fail("boom").unwrap();

        assert!(task.start("again").is_err());
        assert!(task.succeed(overall(1.0), "done").is_err());
        assert!(task.fail("twice").is_err());
        assert!(task.report_progress("still here").is_err());
        assert_eq!(task.message(), "boom");
        assert!(task.result().is_none());
    }

    #[test]
    fn test_cannot_succeed_from_pending() {
        let mut task = Task::new("x");
        let err = task.succeed(overall(5.0), "done").unwrap_err();
        assert_eq!(err.from, TaskStatus::Pending);
        assert_eq!(err.to, TaskStatus::Success);
        assert!(task.result().is_none());
    }

    #[test]
    fn test_status_serializes_screaming_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
    }

    #[test]
    fn test_snapshot_omits_absent_result() {
        let task = Task::new("https://github.com/acme/widget");
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["status"], "PENDING");
        assert_eq!(json["subject"], "https://github.com/acme/widget");
        assert!(json.get("result").is_none());
        assert!(json["task_id"].is_string());
    }

    #[test]
    fn test_overall_result_serializes_flat() {
        let json = serde_json::to_value(overall(7.5)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "repo_url": "https://github.com/acme/widget",
                "overall_score": 7.5,
                "summary": "clear docs"
            })
        );
    }

    #[test]
    fn test_criterion_score_range() {
        assert!(CriterionScore::new(Criterion::Usability, 16.0, "ok").is_ok());
        assert!(CriterionScore::new(Criterion::Usability, 16.5, "too high").is_err());
        assert!(CriterionScore::new(Criterion::TechniquesApplied, -1.0, "negative").is_err());
    }

    #[test]
    fn test_task_id_round_trips_through_str() {
        let id = TaskId::new();
        let parsed: TaskId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<TaskId>().is_err());
    }
}
