//! # waypoint-db
//!
//! PostgreSQL data store and object storage for waypoint.
//!
//! This crate provides:
//! - Connection pool management
//! - Landmark (read-only) and capture (append-only) repositories
//! - Object storage backends for capture photos (Supabase Storage, filesystem)
//!
//! ## Example
//!
//! ```rust,ignore
//! use waypoint_db::{Database, LandmarkRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/waypoint", 5).await?;
//!     let landmarks = db.landmarks.list().await?;
//!     println!("{} landmarks", landmarks.len());
//!     Ok(())
//! }
//! ```

pub mod captures;
pub mod landmarks;
pub mod object_store;
pub mod pool;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use waypoint_core::*;

pub use captures::PgCaptureRepository;
pub use landmarks::PgLandmarkRepository;
pub use object_store::{capture_object_path, FilesystemObjectStore, SupabaseObjectStore};
pub use pool::{create_pool, log_pool_metrics};

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Landmark repository (read-only).
    pub landmarks: std::sync::Arc<PgLandmarkRepository>,
    /// Capture repository (append-only).
    pub captures: std::sync::Arc<PgCaptureRepository>,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            landmarks: std::sync::Arc::new(PgLandmarkRepository::new(pool.clone())),
            captures: std::sync::Arc::new(PgCaptureRepository::new(pool.clone())),
            pool,
        }
    }

    /// Connect to `url` with a pool of at most `max_connections`.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = create_pool(url, max_connections).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Check the database answers a trivial query.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
