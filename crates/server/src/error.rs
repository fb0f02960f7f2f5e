use astra::PipelineError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chat::ChatError;
use leaders::LeaderError;
use serde::{Deserialize, Serialize};

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    #[error("{0}")]
    Chat(#[from] ChatError),

    #[error("{0}")]
    Leaders(#[from] LeaderError),

    #[error("{0} is not configured")]
    Unavailable(&'static str),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ServerError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Pipeline(err) if err.is_input_error() => StatusCode::BAD_REQUEST,
            ServerError::Leaders(LeaderError::EmptyLocation) => StatusCode::BAD_REQUEST,
            ServerError::Leaders(_) => StatusCode::BAD_GATEWAY,
            ServerError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Pipeline(_)
            | ServerError::Chat(_)
            | ServerError::Internal(_)
            | ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::Authentication(_) => "AUTH_FAILED",
            ServerError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::Pipeline(_) => "PIPELINE_ERROR",
            ServerError::Chat(_) => "CHAT_ERROR",
            ServerError::Leaders(_) => "LEADER_LOOKUP_ERROR",
            ServerError::Unavailable(_) => "UNAVAILABLE",
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::Config(_) => "CONFIG_ERROR",
            ServerError::NotFound => "NOT_FOUND",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        let code = self.error_code();
        if status.is_server_error() {
            tracing::error!(code, status = status.as_u16(), error = %message, "request_failed");
        } else {
            tracing::debug!(code, status = status.as_u16(), error = %message, "request_rejected");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<std::net::AddrParseError> for ServerError {
    fn from(err: std::net::AddrParseError) -> Self {
        ServerError::Config(format!("Invalid address: {err}"))
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Internal(format!("IO error: {err}"))
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use astra::TriageError;

    #[test]
    fn pipeline_errors_split_by_cause() {
        let input = ServerError::Pipeline(PipelineError::InvalidReference(TriageError::EmptyReference));
        assert_eq!(input.status_code(), StatusCode::BAD_REQUEST);

        let fetch = ServerError::Pipeline(PipelineError::Fetch(TriageError::Fetch("refused".into())));
        assert_eq!(fetch.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(fetch.error_code(), "PIPELINE_ERROR");
    }

    #[test]
    fn collaborator_statuses() {
        assert_eq!(
            ServerError::Leaders(LeaderError::EmptyLocation).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::Leaders(LeaderError::Http("reset".into())).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ServerError::Chat(ChatError::EmptyUserId).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let unavailable = ServerError::Unavailable("chat");
        assert_eq!(unavailable.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(unavailable.to_string(), "chat is not configured");
    }

    #[test]
    fn bad_request_message_is_bare() {
        let err = ServerError::BadRequest("imageUrl is required".into());
        assert_eq!(err.to_string(), "imageUrl is required");
    }
}
