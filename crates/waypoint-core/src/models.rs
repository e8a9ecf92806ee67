//! Core data models for waypoint.
//!
//! These types are shared across all waypoint crates and represent the
//! domain entities: coordinates, landmarks, and captures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults::DEFAULT_DETECTION_RADIUS_METERS;
use crate::error::{Error, Result};

// =============================================================================
// COORDINATE
// =============================================================================

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Coordinate {
    /// Latitude in decimal degrees (positive = North), within [-90, 90].
    pub latitude: f64,
    /// Longitude in decimal degrees (positive = East), within [-180, 180].
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting non-finite or out-of-range values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::InvalidInput(format!(
                "latitude must be between -90 and 90, got {}",
                latitude
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::InvalidInput(format!(
                "longitude must be between -180 and 180, got {}",
                longitude
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        crate::geo::haversine_distance(self, other)
    }
}

// =============================================================================
// LANDMARK TYPES
// =============================================================================

/// A named point of interest with its own geofence radius.
///
/// Landmarks are maintained by an external administrative process; this
/// service only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Landmark {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub historical_context: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Geofence radius in meters. `None` means
    /// [`DEFAULT_DETECTION_RADIUS_METERS`].
    pub detection_radius_meters: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Landmark {
    /// Position of the landmark.
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// Effective detection radius, falling back to the default when unset.
    pub fn detection_radius(&self) -> f64 {
        self.detection_radius_meters
            .unwrap_or(DEFAULT_DETECTION_RADIUS_METERS)
    }

    /// Compact view used when nesting a landmark inside a capture.
    pub fn summary(&self) -> LandmarkSummary {
        LandmarkSummary {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            image_url: self.image_url.clone(),
        }
    }
}

/// Landmark fields shown alongside a capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LandmarkSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

// =============================================================================
// CAPTURE TYPES
// =============================================================================

/// A photo taken by a user while inside a landmark's radius. Immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Capture {
    pub id: Uuid,
    pub landmark_id: Uuid,
    pub image_url: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Rounded distance reported by the matcher at capture time.
    pub distance_meters: f64,
    /// Client-supplied timestamp, or server time when none was sent.
    pub captured_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A capture joined with the landmark it references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CaptureWithLandmark {
    #[serde(flatten)]
    pub capture: Capture,
    pub landmark: LandmarkSummary,
}

/// Request for recording a new capture.
#[derive(Debug, Clone)]
pub struct CreateCaptureRequest {
    pub landmark_id: Uuid,
    pub image_url: String,
    pub coordinate: Coordinate,
    pub distance_meters: f64,
    pub captured_at: DateTime<Utc>,
}
