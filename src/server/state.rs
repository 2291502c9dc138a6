//! Shared application state injected into every handler.

use crate::analysis::Orchestrator;
use crate::scheduler::Scheduler;
use crate::store::TaskStore;
use std::sync::Arc;

/// State shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Creates tasks and drives them to completion.
    pub orchestrator: Arc<Orchestrator>,
    /// Owns the background units of work; drained on shutdown.
    pub scheduler: Arc<Scheduler>,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>, scheduler: Arc<Scheduler>) -> Self {
        Self {
            orchestrator,
            scheduler,
        }
    }

    pub fn store(&self) -> &Arc<dyn TaskStore> {
        self.orchestrator.store()
    }
}
