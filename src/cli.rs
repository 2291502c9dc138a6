//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and the effective log level.

use clap::Parser;
use std::path::PathBuf;

/// RepoGrader - documentation quality scoring for GitHub repos
///
/// Serves an HTTP API that accepts repository URLs, scores them in the
/// background and exposes status, reports and a ranking.
///
/// Examples:
///   repograder
///   repograder --bind 0.0.0.0:8000 --mode rubric
///   repograder --provider ollama --model llama3.2:latest --api-url http://localhost:11434
///   repograder --init-config
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .repograder.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address the HTTP server listens on
    #[arg(long, value_name = "ADDR", env = "REPOGRADER_BIND")]
    pub bind: Option<String>,

    /// Analysis mode
    #[arg(long, value_name = "MODE")]
    pub mode: Option<AnalysisMode>,

    /// Inference provider
    #[arg(long, value_name = "PROVIDER")]
    pub provider: Option<Provider>,

    /// Model to use for scoring
    #[arg(short, long, env = "REPOGRADER_MODEL")]
    pub model: Option<String>,

    /// Inference API base URL
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Hugging Face access token
    #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
    pub hf_token: Option<String>,

    /// Inference request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Generate a default .repograder.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Which analyzer backs the task pipeline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Fetch the README and ask a model for a single score (default)
    #[default]
    Model,
    /// Ten-criterion rubric evaluation
    Rubric,
}

/// Inference backend for model mode.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Hugging Face inference router (default, needs HF_TOKEN)
    #[default]
    Huggingface,
    /// Local Ollama server
    Ollama,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        Ok(())
    }

    /// Log level used when `RUST_LOG` is not set.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args::default()
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "repograder",
            "--bind",
            "0.0.0.0:9000",
            "--mode",
            "rubric",
            "--provider",
            "ollama",
            "--timeout",
            "30",
        ])
        .unwrap();

        assert_eq!(args.bind.as_deref(), Some("0.0.0.0:9000"));
        assert_eq!(args.mode, Some(AnalysisMode::Rubric));
        assert_eq!(args.provider, Some(Provider::Ollama));
        assert_eq!(args.timeout, Some(30));
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_api_url() {
        let mut args = make_args();
        args.api_url = Some("router.huggingface.co".to_string());
        assert!(args.validate().is_err());

        args.api_url = Some("https://router.huggingface.co/v1".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_init_config_skips_validation() {
        let mut args = make_args();
        args.init_config = true;
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
