//! Core traits for waypoint abstractions.
//!
//! These traits define the interfaces that the relational data store and
//! the object store must satisfy, so the capture workflow can run against
//! PostgreSQL and Supabase Storage in production and in-memory fakes in
//! tests.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// DATA STORE TRAITS
// =============================================================================

/// Read access to landmarks.
#[async_trait]
pub trait LandmarkRepository: Send + Sync {
    /// List all landmarks in a stable order (oldest first, then by id).
    async fn list(&self) -> Result<Vec<Landmark>>;
}

/// Storage of capture records. Captures are append-only.
#[async_trait]
pub trait CaptureRepository: Send + Sync {
    /// Insert a new capture and return the stored row.
    async fn insert(&self, req: CreateCaptureRequest) -> Result<Capture>;

    /// List captures, newest first by creation time.
    async fn list_recent(&self) -> Result<Vec<Capture>>;

    /// List captures joined with their landmark, newest first.
    async fn list_with_landmarks(&self) -> Result<Vec<CaptureWithLandmark>>;
}

// =============================================================================
// OBJECT STORE TRAIT
// =============================================================================

/// Blob storage for uploaded photos.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` at `path`.
    async fn upload(&self, path: &str, data: &[u8], content_type: &str) -> Result<()>;

    /// Public URL at which `path` can be fetched.
    fn public_url(&self, path: &str) -> String;

    /// Remove the object at `path`. Deleting a missing object is not an error.
    async fn delete(&self, path: &str) -> Result<()>;
}
