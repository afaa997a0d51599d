#![recursion_limit = "512"]
//! Dossier REST API server.
//!
//! Exposes the agent registry over HTTP using Axum.
//! Endpoints: /health, /status, /agents, /agents/new, /agents/:id,
//! /agents/:id/edit, /api/generate_codename, /nuke, /openapi

mod handlers;
mod routes;
mod state;

use dossier_config::{DossierConfig, Secret, DEFAULT_HOST, DEFAULT_PORT};
use dossier_core::{AgentStore, CodenameGenerator};

pub use routes::build_router;
pub use state::AppState;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Optional API key for authentication.
    pub api_key: Option<Secret>,
    /// Uniqueness checks per generated codename.
    pub max_attempts: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            api_key: None,
            max_attempts: dossier_core::codename::DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl ServerConfig {
    /// Take the server and codename sections of a loaded config.
    pub fn from_config(config: &DossierConfig) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            api_key: config.server.api_key.clone(),
            max_attempts: config.codename.max_attempts,
        }
    }
}

/// Start the Dossier REST API server with graceful shutdown on SIGTERM/SIGINT.
pub async fn serve(
    store: AgentStore,
    config: ServerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    if config.api_key.is_none() && !is_loopback_host(&config.host) {
        return Err("Refusing to start without an API key on a non-local host".into());
    }

    let state = AppState::with_generator(
        store,
        config.api_key,
        CodenameGenerator::new(config.max_attempts),
    );
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Dossier server listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Dossier server shut down gracefully");
    Ok(())
}

fn is_loopback_host(host: &str) -> bool {
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }
    host.parse::<std::net::IpAddr>()
        .map(|ip| ip.is_loopback())
        .unwrap_or(false)
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
///
/// A handler that fails to install never fires; the other one still can.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { tracing::info!("Received SIGINT, shutting down..."); }
        _ = terminate => { tracing::info!("Received SIGTERM, shutting down..."); }
    }
}
