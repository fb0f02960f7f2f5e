use crate::error::ServerError;
use crate::metrics::HTTP_REQUESTS_TOTAL;
use crate::state::ServerState;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// API key authentication for admin routes
pub async fn api_key_auth(
    State(state): State<Arc<ServerState>>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    if state.config.api_keys.is_empty() {
        return Err(ServerError::Authentication(
            "admin API keys are not configured".to_string(),
        ));
    }

    // Accept "X-API-Key: <key>" or "Authorization: Bearer <key>"
    let api_key = request
        .headers()
        .get("x-api-key")
        .or_else(|| request.headers().get(AUTHORIZATION))
        .and_then(|v| v.to_str().ok())
        .map(|s| s.strip_prefix("Bearer ").unwrap_or(s).trim().to_string());

    match api_key {
        Some(key) => {
            if !state.is_valid_api_key(&key) {
                return Err(ServerError::Authentication("Invalid API key".to_string()));
            }

            if !state.check_rate_limit(&key) {
                return Err(ServerError::RateLimitExceeded);
            }

            Ok(next.run(request).await)
        }
        None => Err(ServerError::Authentication(
            "API key required. Provide it in 'X-API-Key' or 'Authorization: Bearer <key>' header"
                .to_string(),
        )),
    }
}

/// Request ID injection middleware
pub async fn request_id(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    request.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// Request id carried in request extensions.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Logging middleware
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = std::time::Instant::now();

    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();

    tracing::debug!(
        method = %method,
        path = %path,
        request_id = %request_id,
        "request_started"
    );

    let response = next.run(request).await;
    let status = response.status();

    ::metrics::counter!(HTTP_REQUESTS_TOTAL, "status" => status.as_u16().to_string()).increment(1);
    tracing::info!(
        method = %method,
        path = %path,
        status = status.as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        request_id = %request_id,
        "request_completed"
    );

    response
}
