use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::TextModel;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Remote model. `LlmClient` in production; a stub in router tests.
    pub model: Arc<dyn TextModel>,
}
