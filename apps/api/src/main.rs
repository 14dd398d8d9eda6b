mod assist;
mod config;
mod errors;
mod llm_client;
mod proposals;
mod routes;
mod state;
mod upload;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::{build_router, cors_layer};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Proposal API v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::from_config(config.clone())?;

    match &state.completions {
        Some(_) => info!(
            "Completion service configured (model: {}, workers: {})",
            config.openai_chat_model, config.completion_workers
        ),
        None => warn!("OPENAI_API_KEY not set; chat and AI analysis will be unavailable"),
    }
    if !state.speech.is_configured() {
        warn!("ELEVENLABS_API_KEY not set; speech endpoints will be unavailable");
    }
    info!("Draft analysis backend: {}", state.analyzer.backend());
    info!("Allowed CORS origins: {}", config.allowed_origins.join(", "));

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config));

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
