//! In-memory repositories and object store for tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use waypoint_api::testing::{landmark_at, InMemoryCaptures, InMemoryLandmarks, InMemoryObjectStore};
//!
//! let landmarks = Arc::new(InMemoryLandmarks::new(vec![
//!     landmark_at("Old Mill", 51.5, -0.12, None),
//! ]));
//! let captures = Arc::new(InMemoryCaptures::default());
//! let store = Arc::new(InMemoryObjectStore::default());
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;
use waypoint_core::{
    Capture, CaptureRepository, CaptureWithLandmark, CreateCaptureRequest, Error, Landmark,
    LandmarkRepository, ObjectStore, Result,
};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Build a landmark at the given position.
pub fn landmark_at(name: &str, latitude: f64, longitude: f64, radius: Option<f64>) -> Landmark {
    Landmark {
        id: Uuid::now_v7(),
        name: name.to_string(),
        description: format!("{} description", name),
        historical_context: Some(format!("History of {}", name)),
        category: Some("monument".to_string()),
        image_url: None,
        latitude,
        longitude,
        detection_radius_meters: radius,
        created_at: Utc::now(),
    }
}

// =============================================================================
// LANDMARKS
// =============================================================================

/// Fixed landmark list, returned in the order given.
#[derive(Default)]
pub struct InMemoryLandmarks {
    landmarks: Mutex<Vec<Landmark>>,
    fail: AtomicBool,
}

impl InMemoryLandmarks {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self {
            landmarks: Mutex::new(landmarks),
            fail: AtomicBool::new(false),
        }
    }

    /// Make every read fail with a database-style error.
    pub fn fail_reads(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl LandmarkRepository for InMemoryLandmarks {
    async fn list(&self) -> Result<Vec<Landmark>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Internal("landmark query failed".to_string()));
        }
        Ok(lock(&self.landmarks).clone())
    }
}

// =============================================================================
// CAPTURES
// =============================================================================

/// Append-only capture log.
///
/// Landmarks referenced by captures are resolved through `landmarks` when
/// listing with joins; register them with [`InMemoryCaptures::with_landmarks`].
#[derive(Default)]
pub struct InMemoryCaptures {
    captures: Mutex<Vec<Capture>>,
    landmarks: Mutex<Vec<Landmark>>,
    fail_inserts: AtomicBool,
    fail_reads: AtomicBool,
}

impl InMemoryCaptures {
    pub fn with_landmarks(landmarks: Vec<Landmark>) -> Self {
        Self {
            landmarks: Mutex::new(landmarks),
            ..Default::default()
        }
    }

    /// Make inserts fail, simulating a database outage after upload.
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Make listing fail with a database-style error.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Every stored capture in insertion order.
    pub fn all(&self) -> Vec<Capture> {
        lock(&self.captures).clone()
    }
}

#[async_trait]
impl CaptureRepository for InMemoryCaptures {
    async fn insert(&self, req: CreateCaptureRequest) -> Result<Capture> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(Error::Internal("capture insert failed".to_string()));
        }
        let capture = Capture {
            id: Uuid::now_v7(),
            landmark_id: req.landmark_id,
            image_url: req.image_url,
            latitude: req.coordinate.latitude,
            longitude: req.coordinate.longitude,
            distance_meters: req.distance_meters,
            captured_at: req.captured_at,
            created_at: Utc::now(),
        };
        lock(&self.captures).push(capture.clone());
        Ok(capture)
    }

    async fn list_recent(&self) -> Result<Vec<Capture>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::Internal("capture query failed".to_string()));
        }
        let mut captures = self.all();
        captures.reverse();
        captures.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(captures)
    }

    async fn list_with_landmarks(&self) -> Result<Vec<CaptureWithLandmark>> {
        let landmarks = lock(&self.landmarks).clone();
        Ok(self
            .list_recent()
            .await?
            .into_iter()
            .filter_map(|capture| {
                let landmark = landmarks.iter().find(|l| l.id == capture.landmark_id)?;
                Some(CaptureWithLandmark {
                    landmark: landmark.summary(),
                    capture,
                })
            })
            .collect())
    }
}

// =============================================================================
// OBJECT STORE
// =============================================================================

/// Object store that keeps blobs in memory and records deletions.
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
    deleted: Mutex<Vec<String>>,
    fail_uploads: AtomicBool,
}

impl InMemoryObjectStore {
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Paths currently stored, sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = lock(&self.objects).keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn content_type(&self, path: &str) -> Option<String> {
        lock(&self.objects).get(path).map(|(_, ct)| ct.clone())
    }

    pub fn data(&self, path: &str) -> Option<Vec<u8>> {
        lock(&self.objects).get(path).map(|(data, _)| data.clone())
    }

    /// Paths passed to `delete`, in call order.
    pub fn deleted(&self) -> Vec<String> {
        lock(&self.deleted).clone()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn upload(&self, path: &str, data: &[u8], content_type: &str) -> Result<()> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(Error::Storage("upload rejected".to_string()));
        }
        lock(&self.objects).insert(path.to_string(), (data.to_vec(), content_type.to_string()));
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("https://storage.test/public/{}", path)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        lock(&self.objects).remove(path);
        lock(&self.deleted).push(path.to_string());
        Ok(())
    }
}
