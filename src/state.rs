//! Shared application state.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::tools::{BiographyLookup, DocumentSource};

/// State shared by all handlers via axum `State`.
pub struct AppState {
    /// Server configuration, built once at startup.
    pub config: ServerConfig,
    /// Document source backing the biography tool.
    pub documents: Arc<dyn DocumentSource>,
}

impl AppState {
    /// Build state from configuration.
    pub fn new(config: ServerConfig) -> Self {
        let documents: Arc<dyn DocumentSource> = Arc::new(BiographyLookup::new(
            config.biography_url.clone().unwrap_or_default(),
        ));
        Self { config, documents }
    }
}
