//! Hard failures of the triage stages.
//!
//! Only the Fetching stage produces these at runtime; the inference stages
//! degrade instead of failing (see [`Degraded`](crate::Degraded)).

use thiserror::Error;

use crate::Stage;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TriageError {
    /// The image reference was empty after trimming.
    #[error("image reference must not be empty")]
    EmptyReference,
    /// The image request never produced a response.
    #[error("image fetch failed: {0}")]
    Fetch(String),
    /// The image origin answered with a non-success status.
    #[error("image fetch returned status {status} for {url}")]
    FetchStatus { status: u16, url: String },
    /// The image exceeded `max_image_bytes`.
    #[error("image is {size} bytes, limit is {limit}")]
    ImageTooLarge { size: u64, limit: u64 },
    /// A stage did not finish before its deadline.
    #[error("{stage} stage timed out after {after_ms}ms")]
    Timeout { stage: Stage, after_ms: u64 },
    /// Configuration is inconsistent (e.g., a zero deadline).
    #[error("invalid triage config: {0}")]
    InvalidConfig(String),
}

impl TriageError {
    /// Stage the failure belongs to, when it belongs to one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            TriageError::Fetch(_)
            | TriageError::FetchStatus { .. }
            | TriageError::ImageTooLarge { .. } => Some(Stage::Fetching),
            TriageError::Timeout { stage, .. } => Some(*stage),
            TriageError::EmptyReference | TriageError::InvalidConfig(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_fetch_status_display() {
        let err = TriageError::FetchStatus {
            status: 404,
            url: "https://cdn.example/missing.png".into(),
        };
        assert_eq!(
            err.to_string(),
            "image fetch returned status 404 for https://cdn.example/missing.png"
        );
        assert_eq!(err.stage(), Some(Stage::Fetching));
    }

    #[test]
    fn error_timeout_display() {
        let err = TriageError::Timeout {
            stage: Stage::Fetching,
            after_ms: 250,
        };
        assert_eq!(err.to_string(), "fetching stage timed out after 250ms");
        assert_eq!(err.stage(), Some(Stage::Fetching));
    }

    #[test]
    fn error_without_stage() {
        assert_eq!(TriageError::EmptyReference.stage(), None);
        assert_eq!(TriageError::InvalidConfig("x".into()).stage(), None);
    }

    #[test]
    fn error_too_large_display() {
        let err = TriageError::ImageTooLarge {
            size: 2048,
            limit: 1024,
        };
        assert!(err.to_string().contains("2048"));
        assert!(err.to_string().contains("1024"));
    }
}
