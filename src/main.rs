//! RepoGrader - documentation quality scoring for GitHub repositories
//!
//! An HTTP service that accepts repository URLs, scores each one in the
//! background and exposes task status, Markdown reports and a ranking.
//!
//! Exit codes:
//!   0 - Clean shutdown
//!   1 - Configuration or startup error

mod analysis;
mod cli;
mod config;
mod error;
mod fetcher;
mod models;
mod report;
mod scheduler;
mod scorer;
mod server;
mod store;
#[cfg(test)]
mod testing;

use analysis::{Analyzer, Orchestrator, ReadmeAnalyzer, RubricAnalyzer};
use anyhow::{Context, Result};
use cli::{AnalysisMode, Args, Provider};
use config::{Config, DEFAULT_CONFIG_FILE};
use fetcher::HttpFetcher;
use scheduler::Scheduler;
use scorer::huggingface::HuggingFaceConfig;
use scorer::ollama::OllamaConfig;
use scorer::{HuggingFaceScorer, OllamaScorer, Scorer};
use server::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use store::{InMemoryTaskStore, TaskStore};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&args, &config);
    info!(version = env!("CARGO_PKG_VERSION"), "repograder starting");
    debug!(
        bind = %config.server.bind,
        mode = ?config.analysis.mode,
        provider = ?config.model.provider,
        model = %config.model.name,
        "effective configuration"
    );

    if let Err(e) = serve(config).await {
        error!(error = %e, "server failed");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .repograder.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("{} already exists. Remove it first or edit it manually.", DEFAULT_CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("Created {} with default settings.", DEFAULT_CONFIG_FILE);
    Ok(())
}

/// Load the config file, apply CLI overrides and validate.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match args.config {
        Some(ref path) => Config::load(path)?,
        None => Config::load_default()?.unwrap_or_default(),
    };
    config.merge_with_args(args);
    config.validate()?;
    Ok(config)
}

/// Initialize logging. `RUST_LOG` wins over the verbosity flags.
fn init_logging(args: &Args, config: &Config) {
    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);

    if config.general.log_json {
        subscriber.json().init();
    } else {
        subscriber.compact().init();
    }
}

/// Build the collaborators for the configured mode.
fn build_analyzer(config: &Config) -> Result<Arc<dyn Analyzer>> {
    match config.analysis.mode {
        AnalysisMode::Rubric => {
            info!(delay_ms = config.analysis.rubric_delay_ms, "using rubric analyzer");
            Ok(Arc::new(RubricAnalyzer::new(config.rubric_delay())))
        }
        AnalysisMode::Model => {
            let fetcher = Arc::new(HttpFetcher::new(config.fetcher.timeout_seconds)?);
            let scorer = build_scorer(config)?;
            info!(
                provider = ?config.model.provider,
                model = scorer.model_name(),
                api_url = %config.model.api_url,
                "using README analyzer"
            );
            Ok(Arc::new(ReadmeAnalyzer::new(
                fetcher,
                scorer,
                config.readme_settings(),
            )))
        }
    }
}

fn build_scorer(config: &Config) -> Result<Arc<dyn Scorer>> {
    let model = &config.model;
    let scorer: Arc<dyn Scorer> = match model.provider {
        Provider::Huggingface => {
            let token = model
                .token
                .clone()
                .ok_or(error::ConfigError::MissingCredential("HF_TOKEN"))?;
            Arc::new(HuggingFaceScorer::new(HuggingFaceConfig {
                api_url: model.api_url.clone(),
                model_name: model.name.clone(),
                token,
                timeout_seconds: model.timeout_seconds,
            })?)
        }
        Provider::Ollama => Arc::new(OllamaScorer::new(OllamaConfig {
            ollama_url: model.api_url.clone(),
            model_name: model.name.clone(),
            timeout_seconds: model.timeout_seconds,
        })?),
    };
    Ok(scorer)
}

/// Serve HTTP until a shutdown signal, then drain the scheduled work.
async fn serve(config: Config) -> Result<()> {
    let analyzer = build_analyzer(&config)?;
    let store: Arc<dyn TaskStore> = Arc::new(InMemoryTaskStore::new());
    let orchestrator = Arc::new(Orchestrator::new(store, analyzer, config.task_timeout()));
    let scheduler = Arc::new(Scheduler::new());
    let state = Arc::new(AppState::new(orchestrator, Arc::clone(&scheduler)));

    let app = server::build(state);
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address: {}", config.server.bind))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    let aborted = scheduler.drain(config.shutdown_grace()).await;
    if aborted > 0 {
        warn!(aborted, "analyses aborted at shutdown");
    }

    info!("repograder stopped");
    Ok(())
}

/// Resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received; draining in-flight analyses");
}
