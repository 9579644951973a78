use std::sync::Arc;

use crate::config::Config;
use crate::model::ArtifactStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Loaded once at startup; handlers only ever read the cached artifacts.
    pub artifacts: Arc<ArtifactStore>,
    pub config: Config,
}
