use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Provision `userId` into the support channel and return their chat token.
pub async fn issue_token(
    State(state): State<Arc<ServerState>>,
    Path(user_id): Path<String>,
    Query(query): Query<TokenQuery>,
) -> ServerResult<Json<TokenResponse>> {
    let name = query.name.filter(|n| !n.trim().is_empty());
    let (user_id, name) = match (user_id.trim(), name) {
        (id, Some(name)) if !id.is_empty() => (id.to_string(), name),
        _ => {
            return Err(ServerError::BadRequest(
                "userId and name are required".to_string(),
            ))
        }
    };

    let chat = state.chat.as_ref().ok_or(ServerError::Unavailable("chat"))?;
    let token = chat.provision_member(&user_id, &name).await?;
    Ok(Json(TokenResponse { token }))
}

/// Wipe the support channel history. Admin only.
pub async fn truncate_channel(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<Json<serde_json::Value>> {
    let chat = state.chat.as_ref().ok_or(ServerError::Unavailable("chat"))?;
    chat.truncate_support_channel().await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
