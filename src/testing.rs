//! In-process fakes for the external collaborators.

use crate::error::AnalysisError;
use crate::fetcher::DocumentFetcher;
use crate::scorer::Scorer;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Fetcher serving a fixed set of documents and recording every request.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    documents: HashMap<String, String>,
    failure: Option<String>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, url: &str, content: &str) -> Self {
        self.documents.insert(url.to_string(), content.to_string());
        self
    }

    /// Every fetch fails with a transport error.
    pub fn failing_with(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Option<String>, AnalysisError> {
        self.requested.lock().unwrap().push(url.to_string());
        if let Some(message) = &self.failure {
            return Err(AnalysisError::Transport(message.clone()));
        }
        Ok(self
            .documents
            .get(url)
            .filter(|content| !content.trim().is_empty())
            .cloned())
    }
}

/// Scorer returning a canned reply and recording the prompts it receives.
pub struct ScriptedScorer {
    reply: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedScorer {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every completion fails. Only the error's message is kept.
    pub fn failing(error: AnalysisError) -> Self {
        let reply = match error {
            AnalysisError::Model(message) => Err(message),
            other => Err(other.to_string()),
        };
        Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Scorer for ScriptedScorer {
    async fn complete(
        &self,
        prompt: &str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> Result<String, AnalysisError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().map_err(AnalysisError::Model)
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
