//! Capture history handlers.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;
use waypoint_core::CaptureWithLandmark;

use crate::{ApiError, AppState};

#[derive(Debug, Serialize, ToSchema)]
pub struct CaptureListResponse {
    pub success: bool,
    pub captures: Vec<CaptureWithLandmark>,
    pub total: usize,
}

/// List captures with their landmark, newest first.
#[utoipa::path(get, path = "/api/v1/captures", tag = "Captures",
    responses(
        (status = 200, description = "Captures with landmark details", body = CaptureListResponse),
        (status = 500, description = "Database failure"),
    ))]
pub async fn list_captures(
    State(state): State<AppState>,
) -> Result<Json<CaptureListResponse>, ApiError> {
    let captures = state.captures.list_with_landmarks().await?;
    Ok(Json(CaptureListResponse {
        success: true,
        total: captures.len(),
        captures,
    }))
}
