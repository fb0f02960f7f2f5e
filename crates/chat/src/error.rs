use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("invalid chat config: {0}")]
    InvalidConfig(String),
    #[error("user id must not be empty")]
    EmptyUserId,
    #[error("token signing failed: {0}")]
    Token(String),
    #[error("chat request failed: {0}")]
    Http(String),
    #[error("chat service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid chat response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ChatError::Decode(err.to_string())
        } else {
            ChatError::Http(err.to_string())
        }
    }
}
