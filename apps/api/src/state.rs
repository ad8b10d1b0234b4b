use std::sync::Arc;

use crate::llm_client::GenerationService;
use crate::portfolio::submission::SubmissionTracker;
use crate::session::store::KvStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Generation backend. `GeminiClient` in production, doubles in tests.
    pub generator: Arc<dyn GenerationService>,
    /// Identity store shared by all clients; each client sees its own namespace.
    pub kv: Arc<dyn KvStore>,
    pub submissions: Arc<SubmissionTracker>,
}
