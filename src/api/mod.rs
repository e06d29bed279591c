//! API module
//!
//! HTTP gateway over the ledger: endpoints and middleware.

pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::{middleware as axum_middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::ledger::Ledger;

pub use routes::create_router;

/// Build the application router
pub fn build_router(ledger: Arc<Ledger>) -> Router {
    // Layers run last-added first: logging -> identity -> handler
    let api_routes = create_router()
        .layer(axum_middleware::from_fn(middleware::identity_middleware))
        .layer(axum_middleware::from_fn(middleware::logging_middleware));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(ledger)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
