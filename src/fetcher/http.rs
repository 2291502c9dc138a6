//! HTTP document fetcher.

use super::DocumentFetcher;
use crate::error::AnalysisError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

/// Fetches raw files over HTTP with a bounded timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http_client: reqwest::Client,
    timeout_seconds: u64,
}

impl HttpFetcher {
    /// Create a fetcher whose requests give up after `timeout_seconds`.
    pub fn new(timeout_seconds: u64) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(concat!("repograder/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client for the fetcher")?;

        Ok(Self {
            http_client,
            timeout_seconds,
        })
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Option<String>, AnalysisError> {
        debug!(url, "fetching document");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| AnalysisError::from_reqwest(e, url, self.timeout_seconds))?;

        let status = response.status();
        if status != StatusCode::OK {
            debug!(url, %status, "no document at candidate");
            return Ok(None);
        }

        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::from_reqwest(e, url, self.timeout_seconds))?;

        Ok(non_blank(body))
    }
}

/// Whitespace-only documents count as absent.
fn non_blank(body: String) -> Option<String> {
    if body.trim().is_empty() {
        None
    } else {
        Some(body)
    }
}
