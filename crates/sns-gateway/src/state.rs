//! Shared application state for the gateway.

use std::sync::Arc;

use sns_core::TimelineService;

/// State handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The timeline service all routes delegate to.
    pub service: Arc<TimelineService>,
}

impl AppState {
    /// Wrap an existing service.
    pub const fn new(service: Arc<TimelineService>) -> Self {
        Self { service }
    }

    /// State over an in-memory service, for tests and local runs.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(TimelineService::in_memory()))
    }
}
