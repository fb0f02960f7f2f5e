use thiserror::Error;

/// Errors surfaced by a [`TextGenerator`](crate::TextGenerator) call.
///
/// None of these are fatal to the triage pipeline; callers degrade them to
/// empty or sentinel content.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InferenceError {
    /// Configuration is inconsistent (e.g., empty model name or zero timeout).
    #[error("invalid inference config: {0}")]
    InvalidConfig(String),
    /// The request never produced an HTTP response.
    #[error("inference request failed: {0}")]
    Http(String),
    /// The service answered with a non-success status.
    #[error("inference service returned {status}: {body}")]
    Status { status: u16, body: String },
    /// The service did not answer within the configured timeout.
    #[error("inference request timed out")]
    Timeout,
    /// The response body was not valid JSON.
    #[error("invalid inference response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for InferenceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            InferenceError::Timeout
        } else if err.is_decode() {
            InferenceError::Decode(err.to_string())
        } else {
            InferenceError::Http(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_invalid_config() {
        let err = InferenceError::InvalidConfig("model must not be empty".into());
        assert!(err.to_string().contains("invalid inference config"));
        assert!(err.to_string().contains("model must not be empty"));
    }

    #[test]
    fn error_status_includes_code_and_body() {
        let err = InferenceError::Status {
            status: 429,
            body: "quota exhausted".into(),
        };
        assert_eq!(
            err.to_string(),
            "inference service returned 429: quota exhausted"
        );
    }

    #[test]
    fn error_timeout() {
        assert_eq!(
            InferenceError::Timeout.to_string(),
            "inference request timed out"
        );
    }

    #[test]
    fn error_clone_eq() {
        let err = InferenceError::Decode("expected value at line 1".into());
        assert_eq!(err.clone(), err);
    }
}
