//! Configuration file handling.
//!
//! This module handles loading `.repograder.toml`, merging it with CLI
//! arguments and validating the result before the server starts.

use crate::analysis::ReadmeSettings;
use crate::cli::{AnalysisMode, Args, Provider};
use crate::error::ConfigError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".repograder.toml";

const OLLAMA_DEFAULT_URL: &str = "http://localhost:11434";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Analysis pipeline settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// README fetcher settings.
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Inference model settings.
    #[serde(default)]
    pub model: ModelConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Emit logs as JSON lines.
    #[serde(default)]
    pub log_json: bool,

    /// How long shutdown waits for in-flight analyses.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_seconds: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_json: false,
            shutdown_grace_seconds: default_shutdown_grace(),
        }
    }
}

fn default_shutdown_grace() -> u64 {
    30
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

/// Analysis pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Which analyzer to run.
    #[serde(default)]
    pub mode: AnalysisMode,

    /// Characters of README content sent to the model.
    #[serde(default = "default_char_limit")]
    pub readme_char_limit: usize,

    /// Synthetic delay of the rubric analyzer.
    #[serde(default = "default_rubric_delay")]
    pub rubric_delay_ms: u64,

    /// Upper bound for one whole analysis.
    #[serde(default = "default_task_timeout")]
    pub task_timeout_seconds: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            mode: AnalysisMode::default(),
            readme_char_limit: default_char_limit(),
            rubric_delay_ms: default_rubric_delay(),
            task_timeout_seconds: default_task_timeout(),
        }
    }
}

fn default_char_limit() -> usize {
    4000
}

fn default_rubric_delay() -> u64 {
    2000
}

fn default_task_timeout() -> u64 {
    120
}

/// README fetcher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Base URL serving raw repository files.
    #[serde(default = "default_raw_base_url")]
    pub raw_base_url: String,

    /// Branches tried in order.
    #[serde(default = "default_branches")]
    pub branches: Vec<String>,

    /// Documentation file to fetch.
    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_seconds: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            raw_base_url: default_raw_base_url(),
            branches: default_branches(),
            file_name: default_file_name(),
            timeout_seconds: default_fetch_timeout(),
        }
    }
}

fn default_raw_base_url() -> String {
    "https://raw.githubusercontent.com".to_string()
}

fn default_branches() -> Vec<String> {
    vec!["main".to_string(), "master".to_string()]
}

fn default_file_name() -> String {
    "README.md".to_string()
}

fn default_fetch_timeout() -> u64 {
    10
}

/// Inference model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Inference backend.
    #[serde(default)]
    pub provider: Provider,

    /// Model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// Inference API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens in the completion.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds.
    #[serde(default = "default_model_timeout")]
    pub timeout_seconds: u64,

    /// Access token. Only ever taken from the CLI or the environment.
    #[serde(skip)]
    pub token: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            name: default_model(),
            api_url: default_api_url(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_model_timeout(),
            token: None,
        }
    }
}

fn default_model() -> String {
    "mistralai/Mistral-7B-Instruct-v0.2".to_string()
}

fn default_api_url() -> String {
    "https://router.huggingface.co/v1".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    500
}

fn default_model_timeout() -> u64 {
    60
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(ref bind) = args.bind {
            self.server.bind = bind.clone();
        }
        if let Some(mode) = args.mode {
            self.analysis.mode = mode;
        }

        if let Some(provider) = args.provider {
            self.model.provider = provider;
        }
        if let Some(ref api_url) = args.api_url {
            self.model.api_url = api_url.clone();
        } else if self.model.provider == Provider::Ollama && self.model.api_url == default_api_url() {
            self.model.api_url = OLLAMA_DEFAULT_URL.to_string();
        }
        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }
        if let Some(ref token) = args.hf_token {
            if !token.trim().is_empty() {
                self.model.token = Some(token.clone());
            }
        }

        if args.verbose {
            self.general.verbose = true;
        }
        if args.log_json {
            self.general.log_json = true;
        }
    }

    /// Check the merged configuration before anything is started.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.analysis.mode == AnalysisMode::Model
            && self.model.provider == Provider::Huggingface
            && self.model.token.is_none()
        {
            return Err(ConfigError::MissingCredential("HF_TOKEN"));
        }

        if !(0.0..=1.0).contains(&self.model.temperature) {
            return Err(ConfigError::Invalid(
                "model.temperature must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.model.timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "model.timeout_seconds must be at least 1".to_string(),
            ));
        }
        if self.model.max_tokens == 0 {
            return Err(ConfigError::Invalid(
                "model.max_tokens must be at least 1".to_string(),
            ));
        }
        if self.fetcher.timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "fetcher.timeout_seconds must be at least 1".to_string(),
            ));
        }
        if self.fetcher.branches.is_empty() {
            return Err(ConfigError::Invalid(
                "fetcher.branches must name at least one branch".to_string(),
            ));
        }
        if self.analysis.readme_char_limit == 0 {
            return Err(ConfigError::Invalid(
                "analysis.readme_char_limit must be at least 1".to_string(),
            ));
        }
        if self.analysis.task_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "analysis.task_timeout_seconds must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Settings for the README analyzer.
    pub fn readme_settings(&self) -> ReadmeSettings {
        ReadmeSettings {
            raw_base_url: self.fetcher.raw_base_url.clone(),
            branches: self.fetcher.branches.clone(),
            file_name: self.fetcher.file_name.clone(),
            char_limit: self.analysis.readme_char_limit,
            max_tokens: self.model.max_tokens,
            temperature: self.model.temperature,
        }
    }

    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.analysis.task_timeout_seconds)
    }

    pub fn rubric_delay(&self) -> Duration {
        Duration::from_millis(self.analysis.rubric_delay_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.general.shutdown_grace_seconds)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
