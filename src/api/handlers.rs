//! HTTP handlers for the query service.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::orchestrator::Orchestrator;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for POST /query.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    /// Natural language question
    pub query: String,
    /// Analytics property the question applies to
    #[serde(rename = "propertyId")]
    pub property_id: Option<String>,
}

/// Error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// ============================================================================
// State
// ============================================================================

/// Shared state for API handlers.
pub struct ApiState {
    /// Query pipeline. `None` until startup wiring completes; requests
    /// arriving before then get a 503.
    pub orchestrator: Option<Arc<Orchestrator>>,
}

impl ApiState {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            orchestrator: Some(orchestrator),
        }
    }

    /// State with no pipeline attached.
    pub fn uninitialized() -> Self {
        Self { orchestrator: None }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET / - Service banner.
pub async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "assay",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /health - Liveness probe.
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// POST /query - Answer a natural language question.
///
/// The outcome envelope is always returned with status 200; per-agent
/// failures are reported inside it rather than as HTTP errors.
pub async fn query_handler(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<QueryRequest>,
) -> impl IntoResponse {
    let orchestrator = match state.orchestrator.as_ref() {
        Some(orchestrator) => orchestrator,
        None => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: "Service not initialized".to_string(),
                    code: "not_initialized".to_string(),
                }),
            )
                .into_response();
        }
    };

    let preview: String = request.query.chars().take(100).collect();
    info!("Received query: {}...", preview);
    if let Some(property_id) = request.property_id.as_deref().filter(|p| !p.is_empty()) {
        info!("Property ID: {}", property_id);
    }

    let outcome = orchestrator
        .process_query(&request.query, request.property_id.as_deref())
        .await;

    (StatusCode::OK, Json(outcome)).into_response()
}
