use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::{Query, State};
use axum::Json;
use ::leaders::LeaderHit;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct LeadersQuery {
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LeadersResponse {
    pub location: String,
    pub leaders: Vec<LeaderHit>,
}

pub async fn find_leaders(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<LeadersQuery>,
) -> ServerResult<Json<LeadersResponse>> {
    let location = query
        .location
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .ok_or_else(|| ServerError::BadRequest("location is required".to_string()))?;

    let search = state
        .leaders
        .as_ref()
        .ok_or(ServerError::Unavailable("leader lookup"))?;
    let leaders = search.lookup(&location).await?;
    Ok(Json(LeadersResponse { location, leaders }))
}
