mod config;
mod errors;
mod generation;
mod llm_client;
mod routes;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::generation::generator::Generator;
use crate::llm_client::HttpTransport;
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

const SESSION_SWEEP_PERIOD: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on a missing provider key)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Toolsmith API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize provider transport
    let transport = HttpTransport::new(&config.llm_api_url, &config.llm_api_key, config.llm_timeout)?;
    info!(
        "LLM transport initialized (url: {}, timeout: {:?})",
        config.llm_api_url, config.llm_timeout
    );

    // Initialize session store with idle eviction
    let sessions = SessionStore::new(config.session_ttl);
    sessions.spawn_sweeper(SESSION_SWEEP_PERIOD);
    info!("Session store initialized (idle ttl: {:?})", config.session_ttl);

    // Build app state
    let state = AppState {
        generator: Generator::new(Arc::new(transport)),
        sessions,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS origins to the deployed front-end

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
