//! LLM scoring backends.
//!
//! A scorer turns a prompt into raw completion text. What the text means is
//! the analyzer's business; scorers only report transport and API failures.

pub mod huggingface;
pub mod ollama;

pub use huggingface::HuggingFaceScorer;
pub use ollama::OllamaScorer;

use crate::error::AnalysisError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Text-completion capability.
#[async_trait]
pub trait Scorer: Send + Sync {
    /// Complete `prompt`, producing at most `max_tokens` tokens.
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, AnalysisError>;

    /// Model identifier, for logs.
    fn model_name(&self) -> &str;
}

/// Message in a chat request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

/// Turn a non-success HTTP answer into a model error, keeping the body for diagnosis.
pub(crate) async fn error_for_status(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, AnalysisError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = match status.as_u16() {
        401 | 403 => "authentication failed",
        429 => "rate limited",
        _ => "request rejected",
    };
    Err(AnalysisError::Model(format!(
        "{} API error {} ({}): {}",
        provider,
        status,
        detail,
        truncate_for_log(&body, 300)
    )))
}

fn truncate_for_log(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message() {
        let msg = ChatMessage::user("hello");
        assert_eq!(msg.role, "user");
        assert_eq!(msg.content, "hello");
    }

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("short", 10), "short");
        assert_eq!(truncate_for_log("abcdef", 3), "abc...");
        assert_eq!(truncate_for_log("ééééé", 2), "éé...");
    }
}
