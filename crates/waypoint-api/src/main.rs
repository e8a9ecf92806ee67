//! waypoint-api server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use waypoint_api::config::{AppConfig, StorageConfig};
use waypoint_api::services::CaptureService;
use waypoint_api::{build_router, AppState, RouterOptions};
use waypoint_db::{Database, FilesystemObjectStore, ObjectStore, SupabaseObjectStore};

/// Initialize tracing with configurable output.
///
/// Environment variables:
///   LOG_FORMAT  - "json" or "text" (default: "text")
///   LOG_FILE    - path to log file (optional, enables daily-rolling file logging)
///   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
///   RUST_LOG    - standard env filter (default: "waypoint_api=debug,tower_http=debug")
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "waypoint_api=debug,waypoint_db=info,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    let guard = if let Some(ref path) = log_file {
        let path = std::path::Path::new(path);
        let file_dir = path.parent().unwrap_or(std::path::Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("waypoint-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );
    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = init_logging();

    let config = AppConfig::from_env().context("invalid configuration")?;

    let db = Database::connect(&config.database_url, config.db_max_connections)
        .await
        .context("failed to connect to database")?;
    db.migrate().await.context("failed to run migrations")?;
    info!("Database connected and migrated");

    let (store, media_dir): (Arc<dyn ObjectStore>, Option<std::path::PathBuf>) =
        match &config.storage {
            StorageConfig::Supabase {
                url,
                api_key,
                bucket,
            } => {
                info!(bucket = %bucket, "Using Supabase Storage");
                let store: Arc<dyn ObjectStore> =
                    Arc::new(SupabaseObjectStore::new(url, api_key, bucket)?);
                (store, None)
            }
            StorageConfig::Filesystem {
                path,
                public_base_url,
            } => {
                let fs_store = FilesystemObjectStore::new(path.clone(), public_base_url);
                fs_store.validate().await.map_err(|e| {
                    anyhow::anyhow!("file storage at {:?} is not usable: {}", path, e)
                })?;
                info!(path = %path.display(), "Using filesystem storage");
                let store: Arc<dyn ObjectStore> = Arc::new(fs_store);
                (store, Some(path.clone()))
            }
        };

    let capture_service = CaptureService::new(db.landmarks.clone(), db.captures.clone(), store)
        .with_folder(config.captures_folder.clone());

    let state = AppState {
        capture_service: Arc::new(capture_service),
        captures: db.captures.clone(),
        db: Some(db),
    };

    let app = build_router(
        state,
        RouterOptions {
            allowed_origins: config.allowed_origins.clone(),
            max_upload_bytes: config.max_upload_bytes,
            media_dir,
        },
    );

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
