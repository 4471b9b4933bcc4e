use std::sync::Arc;

use crate::config::Config;
use crate::documents::DocumentStore;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Gemini in production; tests swap in a scripted generator.
    pub llm: Arc<dyn TextGenerator>,
    /// Postgres when DATABASE_URL is set, in-memory otherwise.
    pub store: Arc<dyn DocumentStore>,
    pub config: Config,
}
