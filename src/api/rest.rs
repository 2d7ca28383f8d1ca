//! HTTP router and server entry for the query service.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::info;

use crate::api::handlers::{health_handler, query_handler, root_handler, ApiState};
use crate::error::Result;

/// Create the API router.
///
/// Endpoints:
/// - GET  /        - Service banner with version
/// - GET  /health  - Liveness probe
/// - POST /query   - Natural language question answering
pub fn create_router(state: Arc<ApiState>) -> Router {
    let router = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/query", post(query_handler))
        .with_state(state);

    // Panics inside a handler become a 500 instead of tearing down the
    // connection task; the trace layer logs every request around that.
    router
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
}

/// Bind the listener and serve requests until the process is stopped.
pub async fn serve(state: Arc<ApiState>, host: &str, port: u16) -> Result<()> {
    let router = create_router(state);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Listening on http://{}", addr);
    axum::serve(listener, router).await?;

    Ok(())
}
