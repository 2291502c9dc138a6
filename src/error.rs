//! Error types.
//!
//! Errors raised while analyzing a repository never leave the background
//! unit of work: the orchestrator records them on the task as a failure
//! message. Only [`UnknownTaskError`] and [`ConfigError`] reach callers.

use crate::models::{TaskId, TaskStatus};
use thiserror::Error;

/// Failure while driving one analysis.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Network, DNS or timeout failure talking to the fetcher or the scorer.
    #[error("transport error: {0}")]
    Transport(String),

    /// The inference API answered, but not with something usable
    /// (error status, auth failure, rate limit, empty completion).
    #[error("model error: {0}")]
    Model(String),

    /// The completion did not contain a usable JSON verdict.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),
}

impl AnalysisError {
    /// Classify a reqwest failure the same way for every collaborator.
    pub fn from_reqwest(err: reqwest::Error, target: &str, timeout_seconds: u64) -> Self {
        if err.is_timeout() {
            AnalysisError::Transport(format!(
                "request to {} timed out after {}s",
                target, timeout_seconds
            ))
        } else if err.is_connect() {
            AnalysisError::Transport(format!("cannot connect to {}", target))
        } else {
            AnalysisError::Transport(format!("request to {} failed: {}", target, err))
        }
    }
}

/// Failure locating or decoding the JSON object inside a model response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// No `{` or no `}` anywhere in the text.
    #[error("the model response did not contain a JSON object")]
    NoJsonObject,

    /// A brace-delimited span was found but is not valid JSON.
    #[error("the model response contained malformed JSON: {0}")]
    InvalidJson(String),

    /// Valid JSON, but a required field is missing or has the wrong type.
    #[error("the model response is missing the required field '{0}'")]
    MissingField(&'static str),
}

/// Lookup of a task identifier that was never issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("task {0} not found")]
pub struct UnknownTaskError(pub TaskId);

/// A status change that would break the task lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid task transition from {from} to {to}")]
pub struct TransitionError {
    pub from: TaskStatus,
    pub to: TaskStatus,
}

/// Errors returned by [`crate::store::TaskStore::update`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error(transparent)]
    UnknownTask(#[from] UnknownTaskError),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Startup configuration problems. Any of these prevents the server from starting.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A credential the selected provider needs is not set.
    #[error("missing required credential: set the {0} environment variable or pass --hf-token")]
    MissingCredential(&'static str),

    /// A setting is out of range or inconsistent.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_error_wraps_into_analysis_error() {
        let err: AnalysisError = ExtractionError::NoJsonObject.into();
        assert!(matches!(err, AnalysisError::Extraction(_)));
        assert!(err.to_string().contains("did not contain a JSON object"));
    }

    #[test]
    fn test_transition_error_message() {
        let err = TransitionError {
            from: TaskStatus::Success,
            to: TaskStatus::InProgress,
        };
        assert_eq!(
            err.to_string(),
            "invalid task transition from SUCCESS to IN_PROGRESS"
        );
    }

    #[test]
    fn test_missing_credential_names_variable() {
        let err = ConfigError::MissingCredential("HF_TOKEN");
        assert!(err.to_string().contains("HF_TOKEN"));
    }
}
