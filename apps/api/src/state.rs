use std::sync::Arc;

use crate::config::Config;
use crate::flow::controller::FlowController;
use crate::llm_client::TextGenerator;
use crate::session::store::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub flow: FlowController,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, llm: Arc<dyn TextGenerator>) -> Self {
        Self {
            sessions: SessionStore::new(std::time::Duration::from_secs(config.session_ttl_secs)),
            flow: FlowController::new(llm),
            config,
        }
    }
}
