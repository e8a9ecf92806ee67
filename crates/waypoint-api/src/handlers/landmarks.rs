//! Landmark HTTP handlers.
//!
//! `nearby` and `identify` run the proximity matcher against the user's
//! reported position; `identify` additionally stores the photo and records
//! a capture.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use waypoint_core::{Capture, Coordinate, Landmark};

use crate::forms::{CoordinateForm, IdentifyForm};
use crate::{ApiError, AppState};

/// Landmark shown to a user near it.
#[derive(Debug, Serialize, ToSchema)]
pub struct NearbyLandmarkView {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Meters from the user, rounded to two decimals.
    pub distance: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NearbyResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landmark: Option<NearbyLandmarkView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Report the nearest landmark whose detection radius contains the user.
///
/// # Form Fields
/// - `latitude`, `longitude`: decimal degrees (url-encoded or multipart)
///
/// # Returns
/// - 200 OK with `success: true` and the landmark, or `success: false` and a
///   hint when nothing is in range
/// - 400 Bad Request if the coordinates are missing or out of range
#[utoipa::path(post, path = "/api/v1/landmarks/nearby", tag = "Landmarks",
    responses(
        (status = 200, description = "Nearest landmark, if any", body = NearbyResponse),
        (status = 400, description = "Invalid coordinates"),
    ))]
pub async fn nearby_landmark(
    State(state): State<AppState>,
    CoordinateForm(user): CoordinateForm,
) -> Result<Json<NearbyResponse>, ApiError> {
    let found = state.capture_service.nearby(user).await?;

    Ok(Json(match found {
        Some(nearby) => NearbyResponse {
            success: true,
            landmark: Some(NearbyLandmarkView {
                id: nearby.landmark.id,
                name: nearby.landmark.name,
                description: nearby.landmark.description,
                distance: nearby.distance_meters,
            }),
            message: None,
        },
        None => NearbyResponse {
            success: false,
            landmark: None,
            message: Some(waypoint_core::defaults::OUT_OF_RANGE_MESSAGE.to_string()),
        },
    }))
}

/// Captured landmark details.
#[derive(Debug, Serialize, ToSchema)]
pub struct IdentifiedLandmark {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub historical_context: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub distance: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CaptureView {
    pub id: Uuid,
    pub image_url: String,
    pub captured_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IdentifyResponse {
    pub success: bool,
    pub message: String,
    pub landmark: IdentifiedLandmark,
    pub capture: CaptureView,
    /// Public URL of the stored photo (same as `capture.image_url`).
    pub image_url: String,
    /// Id of the capture row (same as `capture.id`).
    pub record_id: Uuid,
    /// Position as received.
    pub received: Coordinate,
}

/// Capture the landmark the user is standing at.
///
/// # Multipart Fields
/// - `image` (required): JPEG photo
/// - `latitude`, `longitude` (required): decimal degrees
/// - `timestamp` (optional): ISO 8601 or epoch milliseconds; server time if absent
///
/// # Returns
/// - 200 OK with the landmark, its distance, and the new capture
/// - 400 Bad Request if no landmark is in range (nothing is stored) or the
///   form is malformed
/// - 500 Internal Server Error if storage or the database fails
#[utoipa::path(post, path = "/api/v1/landmarks/identify", tag = "Landmarks",
    responses(
        (status = 200, description = "Landmark captured", body = IdentifyResponse),
        (status = 400, description = "No landmark in range or invalid form"),
        (status = 500, description = "Storage or database failure"),
    ))]
pub async fn identify_landmark(
    State(state): State<AppState>,
    form: IdentifyForm,
) -> Result<Json<IdentifyResponse>, ApiError> {
    let outcome = state
        .capture_service
        .identify(form.coordinate, &form.image, form.timestamp)
        .await?;

    Ok(Json(identify_response(
        outcome.landmark,
        outcome.distance_meters,
        outcome.capture,
        form.coordinate,
    )))
}

fn identify_response(
    landmark: Landmark,
    distance: f64,
    capture: Capture,
    received: Coordinate,
) -> IdentifyResponse {
    IdentifyResponse {
        success: true,
        message: format!("You found {}!", landmark.name),
        image_url: capture.image_url.clone(),
        record_id: capture.id,
        received,
        landmark: IdentifiedLandmark {
            id: landmark.id,
            name: landmark.name,
            description: landmark.description,
            historical_context: landmark.historical_context,
            category: landmark.category,
            image_url: landmark.image_url,
            distance,
        },
        capture: CaptureView {
            id: capture.id,
            image_url: capture.image_url,
            captured_at: capture.captured_at,
        },
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LandmarkListResponse {
    pub success: bool,
    pub landmarks: Vec<Landmark>,
}

/// List every landmark.
#[utoipa::path(get, path = "/api/v1/landmarks", tag = "Landmarks",
    responses(
        (status = 200, description = "All landmarks", body = LandmarkListResponse),
        (status = 500, description = "Database failure"),
    ))]
pub async fn list_landmarks(
    State(state): State<AppState>,
) -> Result<Json<LandmarkListResponse>, ApiError> {
    let landmarks = state.capture_service.landmarks().await?;
    Ok(Json(LandmarkListResponse {
        success: true,
        landmarks,
    }))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CollectionResponse {
    pub success: bool,
    /// Capture records, newest first.
    pub landmarks: Vec<Capture>,
    pub count: usize,
}

/// The user's collection: every capture, newest first.
#[utoipa::path(get, path = "/api/v1/landmarks/collection", tag = "Landmarks",
    responses(
        (status = 200, description = "Captures, newest first", body = CollectionResponse),
        (status = 500, description = "Database failure"),
    ))]
pub async fn landmark_collection(
    State(state): State<AppState>,
) -> Result<Json<CollectionResponse>, ApiError> {
    let captures = state.captures.list_recent().await?;
    Ok(Json(CollectionResponse {
        success: true,
        count: captures.len(),
        landmarks: captures,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify_response_mirrors_capture() {
        let landmark = crate::testing::landmark_at("Old Mill", 51.5, -0.12, None);
        let capture = Capture {
            id: Uuid::now_v7(),
            landmark_id: landmark.id,
            image_url: "https://storage.test/public/landmark-captures/a.jpg".to_string(),
            latitude: 51.5,
            longitude: -0.12,
            distance_meters: 4.25,
            captured_at: Utc::now(),
            created_at: Utc::now(),
        };
        let received = Coordinate::new(51.5, -0.12).unwrap();

        let resp = identify_response(landmark.clone(), 4.25, capture.clone(), received);
        assert!(resp.success);
        assert_eq!(resp.message, "You found Old Mill!");
        assert_eq!(resp.record_id, capture.id);
        assert_eq!(resp.image_url, capture.image_url);
        assert_eq!(resp.landmark.id, landmark.id);
        assert_eq!(resp.landmark.distance, 4.25);
        assert_eq!(resp.capture.captured_at, capture.captured_at);
    }

    #[test]
    fn test_nearby_miss_omits_landmark() {
        let resp = NearbyResponse {
            success: false,
            landmark: None,
            message: Some("far".to_string()),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("landmark").is_none());
        assert_eq!(json["success"], false);
    }
}
