use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use astra::EmergencyReport;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

/// Request to classify one image
#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
}

/// Run the triage pipeline on `imageUrl`.
///
/// Responds with `{ title, type, description }`, which is the uniform SPAM
/// report whenever the model gave nothing usable. Only a failed image fetch
/// is an error.
pub async fn classify_image(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<ClassifyRequest>, JsonRejection>,
) -> ServerResult<Json<EmergencyReport>> {
    let Json(request) = payload.map_err(|e| ServerError::BadRequest(e.body_text()))?;

    let image_url = request
        .image_url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| ServerError::BadRequest("imageUrl is required".to_string()))?;

    let report = state.pipeline.run(&image_url).await?;
    Ok(Json(report))
}
