use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

fn configured(present: bool) -> &'static str {
    if present {
        "configured"
    } else {
        "disabled"
    }
}

/// Health check endpoint (liveness)
pub async fn health_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "astra-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": state.uptime().as_secs(),
    }))
}

/// Readiness check endpoint
///
/// The pipeline is always ready once the state is built; collaborators
/// report whether their credentials were supplied.
pub async fn readiness_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ready",
        "service": "astra-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": state.uptime().as_secs(),
        "components": {
            "pipeline": "ready",
            "inference_key": configured(state.config.pipeline.inference.api_key.is_some()),
            "chat": configured(state.chat.is_some()),
            "leaders": configured(state.leaders.is_some()),
            "metrics": configured(state.metrics.is_some()),
        }
    }))
}

/// Prometheus metrics endpoint
pub async fn metrics(State(state): State<Arc<ServerState>>) -> ServerResult<impl IntoResponse> {
    let handle = state.metrics.as_ref().ok_or(ServerError::NotFound)?;
    Ok((
        [(CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    ))
}
