//! Hugging Face inference scorer.
//!
//! Talks to the OpenAI-compatible chat completions endpoint exposed by the
//! Hugging Face inference router.

use super::{error_for_status, ChatMessage, Scorer};
use crate::error::AnalysisError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Configuration for the Hugging Face scorer.
#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    /// Base URL, e.g. `https://router.huggingface.co/v1`.
    pub api_url: String,
    pub model_name: String,
    pub token: String,
    pub timeout_seconds: u64,
}

/// Chat completions request.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

/// Chat completions response (only the fields we read).
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Scorer backed by the Hugging Face inference API.
pub struct HuggingFaceScorer {
    config: HuggingFaceConfig,
    http_client: reqwest::Client,
}

impl HuggingFaceScorer {
    pub fn new(config: HuggingFaceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client for Hugging Face")?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl Scorer for HuggingFaceScorer {
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, AnalysisError> {
        let url = self.endpoint();
        let request = ChatCompletionRequest {
            model: &self.config.model_name,
            messages: vec![ChatMessage::user(prompt)],
            max_tokens,
            temperature,
            stream: false,
        };

        debug!(model = %self.config.model_name, max_tokens, "sending completion request");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.config.token)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AnalysisError::from_reqwest(e, "the Hugging Face API", self.config.timeout_seconds)
            })?;

        let response = error_for_status("Hugging Face", response).await?;

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::Model(format!("failed to parse Hugging Face response: {}", e)))?;

        first_choice_content(completion)
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }
}

fn first_choice_content(completion: ChatCompletionResponse) -> Result<String, AnalysisError> {
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| AnalysisError::Model("Hugging Face returned no completion".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer(api_url: &str) -> HuggingFaceScorer {
        HuggingFaceScorer::new(HuggingFaceConfig {
            api_url: api_url.to_string(),
            model_name: "mistralai/Mistral-7B-Instruct-v0.2".to_string(),
            token: "hf_test".to_string(),
            timeout_seconds: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        assert_eq!(
            scorer("https://router.huggingface.co/v1/").endpoint(),
            "https://router.huggingface.co/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatCompletionRequest {
            model: "m",
            messages: vec![ChatMessage::user("score this")],
            max_tokens: 500,
            temperature: 0.1,
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "m");
        assert_eq!(json["max_tokens"], 500);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn test_first_choice_content() {
        let completion: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"{\"overall_score\":7}"}}]}"#,
        )
        .unwrap();
        assert_eq!(
            first_choice_content(completion).unwrap(),
            "{\"overall_score\":7}"
        );
    }

    #[test]
    fn test_empty_choices_is_model_error() {
        let completion: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            first_choice_content(completion),
            Err(AnalysisError::Model(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_api_is_transport_error() {
        let err = scorer("http://127.0.0.1:9/v1")
            .complete("prompt", 10, 0.1)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Transport(_)));
    }
}
