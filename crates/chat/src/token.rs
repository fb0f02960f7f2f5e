//! HS256 JSON Web Tokens for chat users and for server-side calls.

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;

use crate::ChatError;

#[derive(Serialize)]
struct UserClaims<'a> {
    user_id: &'a str,
}

#[derive(Serialize)]
struct ServerClaims {
    server: bool,
}

/// Mints tokens signed with the chat API secret.
#[derive(Clone)]
pub struct TokenSigner {
    key: EncodingKey,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").finish_non_exhaustive()
    }
}

impl TokenSigner {
    pub fn new(secret: &str) -> Result<Self, ChatError> {
        if secret.is_empty() {
            return Err(ChatError::InvalidConfig("api_secret must not be empty".into()));
        }
        Ok(Self {
            key: EncodingKey::from_secret(secret.as_bytes()),
        })
    }

    /// Token a client presents when it connects as `user_id`. No expiry.
    pub fn user_token(&self, user_id: &str) -> Result<String, ChatError> {
        if user_id.trim().is_empty() {
            return Err(ChatError::EmptyUserId);
        }
        self.sign(&UserClaims { user_id })
    }

    /// Token for server-side REST calls.
    pub fn server_token(&self) -> Result<String, ChatError> {
        self.sign(&ServerClaims { server: true })
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, ChatError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.key)
            .map_err(|e| ChatError::Token(e.to_string()))
    }
}
