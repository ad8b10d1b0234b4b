mod config;
mod errors;
mod llm_client;
mod models;
mod portfolio;
mod routes;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::GeminiClient;
use crate::portfolio::submission::SubmissionTracker;
use crate::routes::build_router;
use crate::session::store::{InMemoryKvStore, KvStore, RedisKvStore};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails only on a malformed PORT)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting DeepFolio API v{}", env!("CARGO_PKG_VERSION"));
    config.warn_missing();

    // Initialize identity store (Redis when configured, in-memory otherwise)
    let kv = build_kv_store(&config).await?;

    // Initialize generation client
    let generator = GeminiClient::new(config.api_key.clone())?;
    info!("Generation client initialized (model: {})", llm_client::MODEL);

    // Build app state
    let state = AppState {
        generator: Arc::new(generator),
        kv,
        submissions: Arc::new(SubmissionTracker::new()),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_kv_store(config: &Config) -> Result<Arc<dyn KvStore>> {
    match &config.redis_url {
        Some(url) => {
            let store = RedisKvStore::connect(url).await?;
            info!("Redis identity store connected");
            Ok(Arc::new(store))
        }
        None => {
            info!("REDIS_URL not set; using in-memory identity store");
            Ok(Arc::new(InMemoryKvStore::new()))
        }
    }
}
