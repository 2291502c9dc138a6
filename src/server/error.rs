//! HTTP error type.
//!
//! Every handler returns `Result<T, ServerError>`; the error renders as a
//! JSON body `{"error": "..."}` with a matching status code. Internal
//! details are logged, never returned to the caller.

use crate::error::UnknownTaskError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ServerError {
    /// The caller referenced a task or resource that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request body was malformed or incomplete.
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match self {
            ServerError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}

impl From<UnknownTaskError> for ServerError {
    fn from(e: UnknownTaskError) -> Self {
        ServerError::NotFound(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskId;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_task_maps_to_404() {
        let id = TaskId::new();
        let response = ServerError::from(UnknownTaskError(id)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["error"], format!("task {} not found", id));
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response = ServerError::Internal("lock poisoned at store.rs:42".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "internal server error");
    }

    #[tokio::test]
    async fn test_bad_request_exposes_message() {
        let response = ServerError::BadRequest("repo_url must not be empty".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "repo_url must not be empty");
    }
}
