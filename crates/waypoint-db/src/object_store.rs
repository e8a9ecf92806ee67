//! Object storage backends for capture photos.
//!
//! Two implementations of [`ObjectStore`]:
//! - [`SupabaseObjectStore`] talks to the Supabase Storage REST API.
//! - [`FilesystemObjectStore`] writes under a local directory and serves
//!   URLs from a configured base, for development and tests.
//!
//! ## Example
//!
//! ```rust,ignore
//! use waypoint_db::object_store::{capture_object_path, SupabaseObjectStore};
//!
//! let store = SupabaseObjectStore::new(url, api_key, "game-assets")?;
//! let path = capture_object_path("landmark-captures", &Uuid::new_v4());
//! store.upload(&path, &bytes, "image/jpeg").await?;
//! let url = store.public_url(&path);
//! ```

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use waypoint_core::defaults::CAPTURE_FILE_EXTENSION;
use waypoint_core::{Error, ObjectStore, Result};

/// Timeout applied to every Supabase Storage request.
const STORAGE_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Object path for a new capture photo.
///
/// Path format: `{folder}/{uuid}.jpg`
pub fn capture_object_path(folder: &str, id: &Uuid) -> String {
    let folder = folder.trim_matches('/');
    if folder.is_empty() {
        format!("{}.{}", id.as_hyphenated(), CAPTURE_FILE_EXTENSION)
    } else {
        format!("{}/{}.{}", folder, id.as_hyphenated(), CAPTURE_FILE_EXTENSION)
    }
}

/// Reject absolute paths and parent-directory components.
fn validate_object_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(Error::InvalidInput("Object path cannot be empty".into()));
    }
    let ok = Path::new(path)
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if !ok {
        return Err(Error::InvalidInput(format!("Unsafe object path: {}", path)));
    }
    Ok(())
}

// =============================================================================
// SUPABASE STORAGE
// =============================================================================

/// Supabase Storage backend.
///
/// Uploads go to `POST {url}/storage/v1/object/{bucket}/{path}`; public URLs
/// are `{url}/storage/v1/object/public/{bucket}/{path}`.
pub struct SupabaseObjectStore {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
}

impl SupabaseObjectStore {
    /// Create a client for `bucket` on the Supabase project at `base_url`.
    pub fn new(base_url: &str, api_key: &str, bucket: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| Error::Config(format!("Invalid Supabase API key: {}", e)))?;
        let apikey = HeaderValue::from_str(api_key)
            .map_err(|e| Error::Config(format!("Invalid Supabase API key: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert("apikey", apikey);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(STORAGE_REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
        })
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, path
        )
    }
}

/// Turn a non-2xx storage response into `Error::Storage`.
async fn check_storage_response(op: &str, path: &str, response: reqwest::Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    warn!(
        subsystem = "storage",
        component = "supabase",
        op,
        storage_path = %path,
        status = status.as_u16(),
        error = %body,
        "Storage request failed"
    );
    Err(Error::Storage(format!(
        "{} {} failed with HTTP {}: {}",
        op, path, status, body
    )))
}

#[async_trait]
impl ObjectStore for SupabaseObjectStore {
    async fn upload(&self, path: &str, data: &[u8], content_type: &str) -> Result<()> {
        validate_object_path(path)?;
        debug!(
            subsystem = "storage",
            component = "supabase",
            op = "upload",
            storage_path = %path,
            size_bytes = data.len(),
            "Uploading object"
        );

        let response = self
            .client
            .post(self.object_url(path))
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(data.to_vec())
            .send()
            .await?;
        check_storage_response("upload", path, response).await
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }

    async fn delete(&self, path: &str) -> Result<()> {
        validate_object_path(path)?;
        let response = self.client.delete(self.object_url(path)).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        check_storage_response("delete", path, response).await
    }
}

// =============================================================================
// FILESYSTEM
// =============================================================================

/// Filesystem storage backend.
///
/// Stores objects at `{base_path}/{path}` and reports URLs as
/// `{public_base_url}/{path}`.
pub struct FilesystemObjectStore {
    base_path: PathBuf,
    public_base_url: String,
}

impl FilesystemObjectStore {
    /// Create a new filesystem backend rooted at `base_path`.
    pub fn new(base_path: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            base_path: base_path.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }

    /// Validate that the storage directory can write, read, and delete files.
    ///
    /// Performs a full round-trip at startup to catch permission errors and
    /// missing directories early.
    pub async fn validate(&self) -> std::result::Result<(), String> {
        let test_dir = self.base_path.join(".health-check");
        let test_file = test_dir.join("test.bin");

        fs::create_dir_all(&test_dir)
            .await
            .map_err(|e| format!("create_dir_all({:?}): {}", test_dir, e))?;

        let data = b"storage-health-check";
        fs::write(&test_file, data)
            .await
            .map_err(|e| format!("write({:?}): {}", test_file, e))?;

        let read_data = fs::read(&test_file)
            .await
            .map_err(|e| format!("read({:?}): {}", test_file, e))?;
        if read_data != data {
            return Err("read-back mismatch".to_string());
        }

        fs::remove_file(&test_file)
            .await
            .map_err(|e| format!("remove_file({:?}): {}", test_file, e))?;
        let _ = fs::remove_dir(&test_dir).await;

        Ok(())
    }
}

/// Sibling path an object is written to before being renamed into place.
///
/// The suffix is appended to the whole file name so `a.jpg` and `a.png`
/// never share a temp file.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

#[async_trait]
impl ObjectStore for FilesystemObjectStore {
    async fn upload(&self, path: &str, data: &[u8], content_type: &str) -> Result<()> {
        validate_object_path(path)?;
        let full_path = self.full_path(path);
        debug!(
            subsystem = "storage",
            component = "filesystem",
            op = "upload",
            storage_path = %path,
            content_type,
            size_bytes = data.len(),
            "Writing object"
        );

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                warn!(parent = %parent.display(), error = %e, "object_store: create_dir_all failed");
                e
            })?;
        }

        // Atomic write: temp file + rename
        let temp_path = temp_path_for(&full_path);
        let written = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(data).await?;
            file.sync_all().await
        }
        .await;
        if let Err(e) = written {
            warn!(path = %temp_path.display(), error = %e, "object_store: write failed");
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, &full_path).await {
            warn!(from = %temp_path.display(), to = %full_path.display(), error = %e, "object_store: rename failed");
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&full_path, std::fs::Permissions::from_mode(0o644)).await?;
        }

        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        validate_object_path(path)?;
        let full_path = self.full_path(path);
        if fs::try_exists(&full_path).await? {
            fs::remove_file(full_path).await?;
        }
        Ok(())
    }
}
