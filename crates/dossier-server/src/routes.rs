//! Route definitions for the Dossier REST API.

use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Default request timeout (60 seconds).
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Default maximum request body size (1 MB). Agent forms are tiny.
const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;
/// Default max concurrent requests.
const DEFAULT_CONCURRENCY_LIMIT: usize = 256;

/// Build the Axum router with all Dossier API routes.
///
/// Routes are available both at `/` and `/v1/`. `/` itself lists agents.
/// Health endpoints are always at the root level.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/status", get(handlers::status))
        .route(
            "/agents",
            get(handlers::list_agents).post(handlers::create_agent),
        )
        .route("/agents/new", get(handlers::new_agent_form))
        .route(
            "/agents/:id",
            get(handlers::get_agent)
                .put(handlers::update_agent)
                .delete(handlers::delete_agent),
        )
        .route("/agents/:id/edit", get(handlers::edit_agent_form))
        .route("/api/generate_codename", get(handlers::generate_codename))
        .route("/nuke", post(handlers::nuke))
        .route("/openapi", get(handlers::openapi));

    Router::new()
        .route("/", get(handlers::list_agents))
        .route("/health", get(handlers::health))
        .route("/health/live", get(handlers::health_live))
        .route("/health/ready", get(handlers::health_ready))
        .merge(api_routes.clone())
        .nest("/v1", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(DEFAULT_REQUEST_TIMEOUT))
        .layer(RequestBodyLimitLayer::new(DEFAULT_BODY_LIMIT))
        .layer(ConcurrencyLimitLayer::new(DEFAULT_CONCURRENCY_LIMIT))
}
