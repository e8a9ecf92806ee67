//! Centralized default constants for waypoint.
//!
//! Crates reference these constants instead of defining their own magic
//! numbers. Organized by domain area.

// =============================================================================
// GEODESY
// =============================================================================

/// Mean Earth radius in meters used by the Haversine distance.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Detection radius applied to a landmark whose own radius is unset.
pub const DEFAULT_DETECTION_RADIUS_METERS: f64 = 100.0;

/// Decimal places kept on reported and stored distances.
pub const DISTANCE_DECIMALS: i32 = 2;

// =============================================================================
// CAPTURE WORKFLOW
// =============================================================================

/// Message returned when no landmark is in range of the user.
pub const OUT_OF_RANGE_MESSAGE: &str =
    "No landmarks within range. Move closer to a landmark and try again.";

/// Content type recorded for uploaded capture photos.
pub const CAPTURE_CONTENT_TYPE: &str = "image/jpeg";

/// File extension used for uploaded capture photos.
pub const CAPTURE_FILE_EXTENSION: &str = "jpg";

/// Default object-store bucket.
pub const STORAGE_BUCKET: &str = "game-assets";

/// Default folder inside the bucket for capture photos.
pub const CAPTURES_FOLDER: &str = "landmark-captures";

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 8000;

/// Default bind address.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default maximum request body size for photo uploads (20 MiB).
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Default size of the PostgreSQL connection pool.
pub const DB_MAX_CONNECTIONS: u32 = 5;

/// Default CORS allow-list when `ALLOWED_ORIGINS` is unset or empty.
pub const ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "https://waypoint-1-r7sz.onrender.com",
];

// =============================================================================
// ENVIRONMENT VARIABLES
// =============================================================================

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
pub const ENV_SUPABASE_API_KEY: &str = "SUPABASE_API_KEY";
pub const ENV_STORAGE_BUCKET: &str = "STORAGE_BUCKET";
pub const ENV_CAPTURES_FOLDER: &str = "CAPTURES_FOLDER";
/// `supabase` (default) or `filesystem`.
pub const ENV_STORAGE_BACKEND: &str = "STORAGE_BACKEND";
pub const ENV_FILE_STORAGE_PATH: &str = "FILE_STORAGE_PATH";
pub const ENV_PUBLIC_BASE_URL: &str = "PUBLIC_BASE_URL";
pub const ENV_ALLOWED_ORIGINS: &str = "ALLOWED_ORIGINS";
pub const ENV_HOST: &str = "HOST";
pub const ENV_PORT: &str = "PORT";
pub const ENV_MAX_UPLOAD_BYTES: &str = "MAX_UPLOAD_BYTES";
pub const ENV_DB_MAX_CONNECTIONS: &str = "DB_MAX_CONNECTIONS";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_radius_is_100m() {
        assert_eq!(DEFAULT_DETECTION_RADIUS_METERS, 100.0);
    }

    #[test]
    fn test_default_origins_have_no_wildcard() {
        assert!(!ALLOWED_ORIGINS.is_empty());
        assert!(ALLOWED_ORIGINS.iter().all(|o| *o != "*"));
    }
}
