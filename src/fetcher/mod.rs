//! Documentation fetching.
//!
//! A fetcher retrieves the raw text behind one URL. "Nothing there" is an
//! ordinary answer (`Ok(None)`); only transport failures are errors.

pub mod http;

pub use http::HttpFetcher;

use crate::error::AnalysisError;
use async_trait::async_trait;

/// Retrieves documentation content by URL.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Returns the content at `url`, or `None` if there is no usable content.
    async fn fetch(&self, url: &str) -> Result<Option<String>, AnalysisError>;
}
