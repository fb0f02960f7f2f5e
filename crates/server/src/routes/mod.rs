//! API route handlers
//!
//! - `health`: liveness, readiness and metrics
//! - `triage`: image classification
//! - `support`: chat tokens and channel maintenance
//! - `leaders`: leader lookup

pub mod health;
pub mod leaders;
pub mod support;
pub mod triage;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info
///
/// Root endpoint (GET /), no authentication.
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "Astra Server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "POST /classify-image",
            "GET /token/{userId}?name=",
            "POST /truncate-channel",
            "GET /leaders?location=",
            "GET /health",
            "GET /ready",
            "GET /metrics"
        ]
    })))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
