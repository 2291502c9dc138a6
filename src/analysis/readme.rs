//! README-based documentation scoring.
//!
//! The analyzer looks for the repository README on a list of candidate
//! branches, asks the scorer for a JSON verdict and validates it. A missing
//! README is not an error: it selects a prompt that confines the score to
//! a low range.

use super::extract::{extract_json, required_f64, required_str};
use super::{Analyzer, ProgressReporter};
use crate::error::AnalysisError;
use crate::fetcher::DocumentFetcher;
use crate::models::{AnalysisResult, OverallScore};
use crate::scorer::Scorer;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Score range when a README was found.
pub const DOCUMENTED_RANGE: (f64, f64) = (0.0, 10.0);

/// Score range when no README could be found.
pub const UNDOCUMENTED_RANGE: (f64, f64) = (0.0, 2.0);

/// Settings for the README analyzer.
#[derive(Debug, Clone)]
pub struct ReadmeSettings {
    /// Base URL serving raw repository files.
    pub raw_base_url: String,
    /// Branches to try, in order.
    pub branches: Vec<String>,
    /// Documentation file name.
    pub file_name: String,
    /// Characters of README content embedded in the prompt.
    pub char_limit: usize,
    /// Completion budget.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for ReadmeSettings {
    fn default() -> Self {
        Self {
            raw_base_url: "https://raw.githubusercontent.com".to_string(),
            branches: vec!["main".to_string(), "master".to_string()],
            file_name: "README.md".to_string(),
            char_limit: 4000,
            max_tokens: 500,
            temperature: 0.1,
        }
    }
}

/// Owner and repository name of a GitHub project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub repo: String,
}

impl RepoSlug {
    /// Parse `https://github.com/owner/repo` (optionally with a trailing
    /// slash, `.git` suffix or extra path) or a bare `owner/repo`.
    pub fn parse(subject: &str) -> Option<Self> {
        let subject = subject.trim();
        let path = if let Some((scheme, rest)) = subject.split_once("://") {
            if scheme != "https" && scheme != "http" {
                return None;
            }
            let (host, path) = rest.split_once('/')?;
            if !host.eq_ignore_ascii_case("github.com") && !host.eq_ignore_ascii_case("www.github.com") {
                return None;
            }
            path
        } else {
            subject
        };

        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let owner = segments.next()?;
        let repo = segments.next()?;
        let repo = repo.strip_suffix(".git").unwrap_or(repo);

        if !is_valid_segment(owner) || !is_valid_segment(repo) {
            return None;
        }

        Some(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Candidate raw-file URLs for `slug`, one per branch, in order.
pub fn candidate_urls(settings: &ReadmeSettings, slug: &RepoSlug) -> Vec<String> {
    let base = settings.raw_base_url.trim_end_matches('/');
    settings
        .branches
        .iter()
        .map(|branch| {
            format!(
                "{}/{}/{}/{}/{}",
                base, slug.owner, slug.repo, branch, settings.file_name
            )
        })
        .collect()
}

/// First `limit` characters of `content`.
pub fn truncate_chars(content: &str, limit: usize) -> &str {
    match content.char_indices().nth(limit) {
        Some((byte_index, _)) => &content[..byte_index],
        None => content,
    }
}

/// Prompt used when README content is available.
pub fn documented_prompt(subject: &str, readme: &str) -> String {
    format!(
        r#"You are a senior software engineer.
Review the following README.md of a software project and assign it a quality score from 0.0 to 10.0.
Consider clarity, completeness of the instructions and professionalism.

README.md content:
---
{readme}
---

Your answer MUST be ONLY a valid JSON object, with no additional text.
The JSON must have exactly this structure:
{{
  "repo_url": "{subject}",
  "overall_score": <your numeric score between 0.0 and 10.0>,
  "summary": "<a short justification of the score based on the README>"
}}"#
    )
}

/// Prompt used when no README could be retrieved.
pub fn undocumented_prompt(subject: &str) -> String {
    format!(
        r#"You are a senior software engineer.
The analysis of the project at '{subject}' could not find a README.md file, or found an empty one.
Missing documentation is a serious software engineering failure.

Based only on this information, assign a quality score. The score must be very low, between 0.0 and 2.0.

Your answer MUST be ONLY a valid JSON object, with no additional text.
The JSON must have exactly this structure:
{{
  "repo_url": "{subject}",
  "overall_score": <your numeric score between 0.0 and 2.0>,
  "summary": "The score is extremely low because the project has no README.md file or it is empty."
}}"#
    )
}

/// Validate the model's JSON verdict and clamp its score into `range`.
pub fn parse_verdict(text: &str, range: (f64, f64)) -> Result<OverallScore, AnalysisError> {
    let map = extract_json(text)?;
    let repo_url = required_str(&map, "repo_url")?;
    let raw_score = required_f64(&map, "overall_score")?;
    let summary = required_str(&map, "summary")?;

    let (low, high) = range;
    let overall_score = raw_score.clamp(low, high);
    if overall_score != raw_score {
        warn!(
            raw_score,
            clamped = overall_score,
            "model score outside the allowed range"
        );
    }

    Ok(OverallScore {
        repo_url,
        overall_score,
        summary,
    })
}

/// Scores a repository from its README.
pub struct ReadmeAnalyzer {
    fetcher: Arc<dyn DocumentFetcher>,
    scorer: Arc<dyn Scorer>,
    settings: ReadmeSettings,
}

impl ReadmeAnalyzer {
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        scorer: Arc<dyn Scorer>,
        settings: ReadmeSettings,
    ) -> Self {
        Self {
            fetcher,
            scorer,
            settings,
        }
    }

    /// Try each candidate in order; the first one with content wins.
    async fn fetch_readme(&self, subject: &str) -> Result<Option<String>, AnalysisError> {
        let Some(slug) = RepoSlug::parse(subject) else {
            info!(subject, "subject is not a GitHub repository; treating README as absent");
            return Ok(None);
        };

        for url in candidate_urls(&self.settings, &slug) {
            if let Some(content) = self.fetcher.fetch(&url).await? {
                debug!(url = %url, chars = content.chars().count(), "README found");
                return Ok(Some(content));
            }
        }

        Ok(None)
    }
}

#[async_trait]
impl Analyzer for ReadmeAnalyzer {
    async fn analyze(
        &self,
        subject: &str,
        progress: &ProgressReporter,
    ) -> Result<AnalysisResult, AnalysisError> {
        let readme = self.fetch_readme(subject).await?;

        let (prompt, range) = match readme {
            Some(content) => {
                progress.report("README.md found, invoking model...");
                let excerpt = truncate_chars(&content, self.settings.char_limit);
                (documented_prompt(subject, excerpt), DOCUMENTED_RANGE)
            }
            None => {
                progress.report(
                    "README.md not found or empty, invoking model to score the missing documentation...",
                );
                (undocumented_prompt(subject), UNDOCUMENTED_RANGE)
            }
        };

        info!(subject, model = self.scorer.model_name(), "requesting verdict");
        let text = self
            .scorer
            .complete(&prompt, self.settings.max_tokens, self.settings.temperature)
            .await?;

        let verdict = parse_verdict(&text, range)?;
        Ok(AnalysisResult::Overall(verdict))
    }

    fn initial_message(&self) -> &'static str {
        "fetching README.md from the repository..."
    }
}
