//! Request handlers.
//!
//! Submission endpoints acknowledge with `202 Accepted` and the PENDING
//! snapshot; everything else is a read of the task store.
//!
//! Submitted work is gated on the acknowledgement: it starts once the
//! response body has been handed to the connection, or the client has gone.

use super::error::ServerError;
use super::state::AppState;
use crate::analysis::orchestrator::StartGate;
use crate::analysis::{rank, RankingEntry};
use crate::error::UnknownTaskError;
use crate::models::{CriterionScore, Task, TaskId};
use crate::report;
use axum::body::{Body, Bytes};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::debug;

/// Status reported by `/report` when no task has the requested subject.
pub const NOT_FOUND_STATUS: &str = "NOT_FOUND";

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(alias = "subject")]
    pub repo_url: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub urls: Vec<String>,
}

/// A task as returned over HTTP, with `repo_url` for the web frontend.
#[derive(Debug, Serialize)]
pub struct TaskSnapshot {
    #[serde(flatten)]
    task: Task,
    repo_url: String,
}

impl From<Task> for TaskSnapshot {
    fn from(task: Task) -> Self {
        let repo_url = task.subject().to_string();
        Self { task, repo_url }
    }
}

/// Report lookup by subject.
#[derive(Debug, Serialize)]
pub struct ReportView {
    pub subject: String,
    pub repo_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criteria: Option<Vec<CriterionScore>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
}

impl ReportView {
    fn not_found(subject: String) -> Self {
        Self {
            repo_url: subject.clone(),
            subject,
            task_id: None,
            status: NOT_FOUND_STATUS.to_string(),
            total_score: None,
            criteria: None,
            report: None,
        }
    }

    fn from_task(task: &Task) -> Self {
        let result = task.result();
        Self {
            subject: task.subject().to_string(),
            repo_url: task.subject().to_string(),
            task_id: Some(task.id()),
            status: task.status().as_str().to_string(),
            total_score: result.and_then(|r| r.total_score()),
            criteria: result.map(|r| r.criteria().to_vec()),
            report: result.map(|r| report::render_result(task.subject(), r)),
        }
    }
}

fn validate_subject(subject: &str) -> Result<&str, ServerError> {
    let subject = subject.trim();
    if subject.is_empty() {
        return Err(ServerError::BadRequest(
            "repository URL must not be empty".to_string(),
        ));
    }
    Ok(subject)
}

fn body_error(rejection: JsonRejection) -> ServerError {
    ServerError::BadRequest(rejection.body_text())
}

/// `202 Accepted` whose body releases `gates` once it has been fully read or dropped.
fn accepted<T: Serialize>(payload: &T, gates: Vec<StartGate>) -> Result<Response, ServerError> {
    let bytes = serde_json::to_vec(payload)
        .map(Bytes::from)
        .map_err(|e| ServerError::Internal(format!("could not encode response: {}", e)))?;

    let chunks = futures::stream::unfold((Some(bytes), gates), |(chunk, gates)| async move {
        chunk.map(|bytes| (Ok::<_, Infallible>(bytes), (None, gates)))
    });

    Ok((
        StatusCode::ACCEPTED,
        [(header::CONTENT_TYPE, "application/json")],
        Body::from_stream(chunks),
    )
        .into_response())
}

/// `POST /analyze`
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Response, ServerError> {
    let Json(request) = payload.map_err(body_error)?;
    let subject = validate_subject(&request.repo_url)?;

    let (task, gate) = state.orchestrator.submit(&state.scheduler, subject);
    accepted(&TaskSnapshot::from(task), vec![gate])
}

/// `POST /submit`
///
/// All URLs are validated before any task is created.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<Response, ServerError> {
    let Json(request) = payload.map_err(body_error)?;
    let subjects = request
        .urls
        .iter()
        .map(|url| validate_subject(url))
        .collect::<Result<Vec<_>, _>>()?;

    let (snapshots, gates): (Vec<TaskSnapshot>, Vec<StartGate>) = subjects
        .into_iter()
        .map(|subject| {
            let (task, gate) = state.orchestrator.submit(&state.scheduler, subject);
            (TaskSnapshot::from(task), gate)
        })
        .unzip();
    debug!(count = snapshots.len(), "batch submitted");

    accepted(&snapshots, gates)
}

/// `GET /status/{id}`
pub async fn status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TaskSnapshot>, ServerError> {
    let task_id: TaskId = id
        .parse()
        .map_err(|_| ServerError::NotFound(format!("task {} not found", id)))?;

    let task = state
        .store()
        .get(&task_id)
        .ok_or(UnknownTaskError(task_id))?;
    Ok(Json(TaskSnapshot::from(task)))
}

/// `GET /report/{*subject}`
///
/// Unknown subjects get a 200 with status `NOT_FOUND`. A task that has not
/// finished reports its current status without a report.
pub async fn report(
    State(state): State<Arc<AppState>>,
    Path(subject): Path<String>,
) -> Json<ReportView> {
    let view = match state.store().find_by_subject(&subject) {
        Some(task) => ReportView::from_task(&task),
        None => ReportView::not_found(subject),
    };
    Json(view)
}

/// `GET /ranking`
pub async fn ranking(State(state): State<Arc<AppState>>) -> Json<Vec<RankingEntry>> {
    Json(rank(&state.store().list()))
}

/// `GET /health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "tasks_in_flight": state.scheduler.in_flight(),
    }))
}
