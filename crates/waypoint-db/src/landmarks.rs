//! Landmark repository implementation.
//!
//! Landmarks are written by an external administrative process; this
//! repository only reads them.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;

use waypoint_core::{Error, Landmark, LandmarkRepository, Result};

const LANDMARK_COLUMNS: &str = "id, name, description, historical_context, category, image_url, \
     latitude, longitude, detection_radius_meters, created_at";

/// PostgreSQL implementation of LandmarkRepository.
pub struct PgLandmarkRepository {
    pool: Pool<Postgres>,
}

impl PgLandmarkRepository {
    /// Create a new PgLandmarkRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

pub(crate) fn landmark_from_row(row: &PgRow) -> Landmark {
    Landmark {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        historical_context: row.get("historical_context"),
        category: row.get("category"),
        image_url: row.get("image_url"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        detection_radius_meters: row.get("detection_radius_meters"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl LandmarkRepository for PgLandmarkRepository {
    async fn list(&self) -> Result<Vec<Landmark>> {
        // Stable order so the matcher's first-seen tie-break is deterministic.
        let rows = sqlx::query(&format!(
            "SELECT {} FROM landmark ORDER BY created_at, id",
            LANDMARK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "database",
            db_table = "landmark",
            op = "list",
            result_count = rows.len(),
            "Listed landmarks"
        );

        Ok(rows.iter().map(landmark_from_row).collect())
    }
}
