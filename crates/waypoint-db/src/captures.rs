//! Capture repository implementation.
//!
//! Captures are append-only: there is no update or delete path.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, info};
use uuid::Uuid;

use waypoint_core::{
    Capture, CaptureRepository, CaptureWithLandmark, CreateCaptureRequest, Error,
    LandmarkSummary, Result,
};

/// PostgreSQL implementation of CaptureRepository.
pub struct PgCaptureRepository {
    pool: Pool<Postgres>,
}

impl PgCaptureRepository {
    /// Create a new PgCaptureRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn capture_from_row(row: &PgRow) -> Capture {
    Capture {
        id: row.get("id"),
        landmark_id: row.get("landmark_id"),
        image_url: row.get("image_url"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        distance_meters: row.get("distance_meters"),
        captured_at: row.get("captured_at"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl CaptureRepository for PgCaptureRepository {
    async fn insert(&self, req: CreateCaptureRequest) -> Result<Capture> {
        let id = Uuid::now_v7();
        let row = sqlx::query(
            r#"INSERT INTO landmark_capture
               (id, landmark_id, image_url, latitude, longitude, distance_meters, captured_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING id, landmark_id, image_url, latitude, longitude,
                         distance_meters, captured_at, created_at"#,
        )
        .bind(id)
        .bind(req.landmark_id)
        .bind(&req.image_url)
        .bind(req.coordinate.latitude)
        .bind(req.coordinate.longitude)
        .bind(req.distance_meters)
        .bind(req.captured_at)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        info!(
            subsystem = "database",
            db_table = "landmark_capture",
            op = "insert",
            capture_id = %id,
            landmark_id = %req.landmark_id,
            "Capture recorded"
        );

        Ok(capture_from_row(&row))
    }

    async fn list_recent(&self) -> Result<Vec<Capture>> {
        let rows = sqlx::query(
            r#"SELECT id, landmark_id, image_url, latitude, longitude,
                      distance_meters, captured_at, created_at
               FROM landmark_capture
               ORDER BY created_at DESC, id DESC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "database",
            db_table = "landmark_capture",
            op = "list_recent",
            result_count = rows.len(),
            "Listed captures"
        );

        Ok(rows.iter().map(capture_from_row).collect())
    }

    async fn list_with_landmarks(&self) -> Result<Vec<CaptureWithLandmark>> {
        let rows = sqlx::query(
            r#"SELECT c.id, c.landmark_id, c.image_url, c.latitude, c.longitude,
                      c.distance_meters, c.captured_at, c.created_at,
                      l.name AS landmark_name, l.description AS landmark_description,
                      l.category AS landmark_category, l.image_url AS landmark_image_url
               FROM landmark_capture c
               JOIN landmark l ON l.id = c.landmark_id
               ORDER BY c.created_at DESC, c.id DESC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let captures = rows
            .iter()
            .map(|row| {
                let capture = capture_from_row(row);
                let landmark = LandmarkSummary {
                    id: capture.landmark_id,
                    name: row.get("landmark_name"),
                    description: row.get("landmark_description"),
                    category: row.get("landmark_category"),
                    image_url: row.get("landmark_image_url"),
                };
                CaptureWithLandmark { capture, landmark }
            })
            .collect();

        Ok(captures)
    }
}
