//! Capture workflow: match the user's position to a landmark, store the
//! photo, and record the capture.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;
use waypoint_core::defaults::{CAPTURE_CONTENT_TYPE, CAPTURES_FOLDER};
use waypoint_core::{
    find_nearest_landmark, rank_landmarks_by_distance, Capture, CaptureRepository, Coordinate,
    CreateCaptureRequest, Error, Landmark, LandmarkRepository, ObjectStore, Result,
};
use waypoint_db::capture_object_path;

/// Nearest in-range landmark for a position.
#[derive(Debug, Clone)]
pub struct NearbyLandmark {
    pub landmark: Landmark,
    /// Rounded to two decimals.
    pub distance_meters: f64,
}

/// Result of a successful capture.
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    pub landmark: Landmark,
    pub distance_meters: f64,
    pub capture: Capture,
}

/// Orchestrates the matcher, object store, and capture repository.
pub struct CaptureService {
    landmarks: Arc<dyn LandmarkRepository>,
    captures: Arc<dyn CaptureRepository>,
    store: Arc<dyn ObjectStore>,
    folder: String,
}

impl CaptureService {
    pub fn new(
        landmarks: Arc<dyn LandmarkRepository>,
        captures: Arc<dyn CaptureRepository>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            landmarks,
            captures,
            store,
            folder: CAPTURES_FOLDER.to_string(),
        }
    }

    /// Store photos under `folder` instead of the default captures folder.
    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into().trim_matches('/').to_string();
        self
    }

    /// Find the nearest landmark whose radius contains `user`, if any.
    pub async fn nearby(&self, user: Coordinate) -> Result<Option<NearbyLandmark>> {
        let landmarks = self.landmarks.list().await?;

        if tracing::enabled!(tracing::Level::DEBUG) {
            for ranked in rank_landmarks_by_distance(&user, &landmarks).iter().take(3) {
                debug!(
                    subsystem = "capture",
                    op = "nearby",
                    landmark_id = %ranked.landmark.id,
                    distance_m = ranked.distance_meters,
                    in_range = ranked.in_range,
                    "Closest landmark candidate"
                );
            }
        }

        Ok(find_nearest_landmark(&user, &landmarks).map(|m| NearbyLandmark {
            landmark: m.landmark.clone(),
            distance_meters: m.distance_meters,
        }))
    }

    /// Record a capture of the nearest in-range landmark.
    ///
    /// Returns [`Error::OutOfRange`] without touching storage when no
    /// landmark is in range. If the capture row cannot be written, the
    /// uploaded photo is deleted before the insert error is returned.
    pub async fn identify(
        &self,
        user: Coordinate,
        image: &[u8],
        captured_at: Option<DateTime<Utc>>,
    ) -> Result<CaptureOutcome> {
        let start = Instant::now();
        let landmarks = self.landmarks.list().await?;

        let Some(found) = find_nearest_landmark(&user, &landmarks) else {
            info!(
                subsystem = "capture",
                op = "identify",
                latitude = user.latitude,
                longitude = user.longitude,
                candidates = landmarks.len(),
                "No landmark in range"
            );
            return Err(Error::out_of_range());
        };
        let landmark = found.landmark.clone();
        let distance_meters = found.distance_meters;

        let object_path = capture_object_path(&self.folder, &Uuid::new_v4());
        self.store
            .upload(&object_path, image, CAPTURE_CONTENT_TYPE)
            .await?;
        let image_url = self.store.public_url(&object_path);

        let request = CreateCaptureRequest {
            landmark_id: landmark.id,
            image_url,
            coordinate: user,
            distance_meters,
            captured_at: captured_at.unwrap_or_else(Utc::now),
        };

        let capture = match self.captures.insert(request).await {
            Ok(capture) => capture,
            Err(insert_err) => {
                if let Err(delete_err) = self.store.delete(&object_path).await {
                    warn!(
                        subsystem = "capture",
                        op = "identify",
                        storage_path = %object_path,
                        error = %delete_err,
                        "Failed to remove photo after capture insert failed"
                    );
                }
                return Err(insert_err);
            }
        };

        info!(
            subsystem = "capture",
            op = "identify",
            landmark_id = %landmark.id,
            capture_id = %capture.id,
            distance_m = distance_meters,
            size_bytes = image.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Landmark captured"
        );

        Ok(CaptureOutcome {
            landmark,
            distance_meters,
            capture,
        })
    }

    /// All landmarks in repository order.
    pub async fn landmarks(&self) -> Result<Vec<Landmark>> {
        self.landmarks.list().await
    }
}
