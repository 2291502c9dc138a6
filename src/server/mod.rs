//! HTTP surface.
//!
//! [`build`] assembles the router: submission, status, report, ranking and
//! health routes, plus the `/api` aliases used by the web frontend.

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ServerError;
pub use state::AppState;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the complete router for the application.
pub fn build(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/analyze", post(handlers::analyze))
        .route("/api/analyze", post(handlers::analyze))
        .route("/submit", post(handlers::submit))
        .route("/status/{id}", get(handlers::status))
        .route("/api/status/{id}", get(handlers::status))
        .route("/report/{*subject}", get(handlers::report))
        .route("/ranking", get(handlers::ranking))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
