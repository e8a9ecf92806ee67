//! # waypoint-api
//!
//! HTTP API for the waypoint landmark-hunting game.
//!
//! The binary in `main.rs` wires configuration, PostgreSQL, and object
//! storage into [`AppState`] and serves [`build_router`]. Tests build the
//! same router over the in-memory implementations in [`testing`].

pub mod config;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod services;
pub mod testing;

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;
use waypoint_core::CaptureRepository;
use waypoint_db::Database;

pub use error::ApiError;
use handlers::{captures, health, landmarks};
use services::CaptureService;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub capture_service: Arc<CaptureService>,
    pub captures: Arc<dyn CaptureRepository>,
    /// Present in production; used by the health check.
    pub db: Option<Database>,
}

/// Router-level settings that come from configuration.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub allowed_origins: Vec<HeaderValue>,
    pub max_upload_bytes: usize,
    /// Directory served under `/media` (filesystem storage backend).
    pub media_dir: Option<PathBuf>,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            allowed_origins: config::parse_allowed_origins(None),
            max_upload_bytes: waypoint_core::defaults::MAX_UPLOAD_BYTES,
            media_dir: None,
        }
    }
}

/// Request ID generator using UUIDv7 (time-ordered).
#[derive(Clone, Copy)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Waypoint API",
        description = "Landmark proximity matching and photo captures"
    ),
    paths(
        landmarks::nearby_landmark,
        landmarks::identify_landmark,
        landmarks::list_landmarks,
        landmarks::landmark_collection,
        captures::list_captures,
        health::health_check,
    ),
    components(schemas(
        landmarks::NearbyResponse,
        landmarks::NearbyLandmarkView,
        landmarks::IdentifyResponse,
        landmarks::IdentifiedLandmark,
        landmarks::CaptureView,
        landmarks::LandmarkListResponse,
        landmarks::CollectionResponse,
        captures::CaptureListResponse,
        health::HealthResponse,
        waypoint_core::Landmark,
        waypoint_core::LandmarkSummary,
        waypoint_core::Capture,
        waypoint_core::CaptureWithLandmark,
        waypoint_core::Coordinate,
    )),
    tags(
        (name = "Landmarks", description = "Proximity matching and captures"),
        (name = "Captures", description = "Capture history"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;

/// Build the application router with all middleware.
pub fn build_router(state: AppState, options: RouterOptions) -> Router {
    let mut app = Router::new()
        .route("/health", get(health::health_check))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/v1/landmarks", get(landmarks::list_landmarks))
        .route("/api/v1/landmarks/nearby", post(landmarks::nearby_landmark))
        .route("/api/v1/landmarks/identify", post(landmarks::identify_landmark))
        .route(
            "/api/v1/landmarks/collection",
            get(landmarks::landmark_collection),
        )
        .route("/api/v1/captures", get(captures::list_captures));

    if let Some(dir) = options.media_dir {
        app = app.nest_service("/media", ServeDir::new(dir));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(options.allowed_origins))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(std::time::Duration::from_secs(3600)),
        )
        // Axum's 2 MB default would reject phone photos before the tower limit applies.
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(options.max_upload_bytes))
        .with_state(state)
}
