//! CORS behavior of the assembled router.
//!
//! Verifies:
//! - configured origins are echoed back, never `*`
//! - unknown origins get no CORS headers
//! - preflight advertises only GET/POST/OPTIONS, credentials, and max-age

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;
use waypoint_api::config::parse_allowed_origins;
use waypoint_api::services::CaptureService;
use waypoint_api::testing::{InMemoryCaptures, InMemoryLandmarks, InMemoryObjectStore};
use waypoint_api::{build_router, AppState, RouterOptions};

fn router(allowed: Option<&str>) -> Router {
    let captures = Arc::new(InMemoryCaptures::default());
    let service = CaptureService::new(
        Arc::new(InMemoryLandmarks::default()),
        captures.clone(),
        Arc::new(InMemoryObjectStore::default()),
    );
    build_router(
        AppState {
            capture_service: Arc::new(service),
            captures,
            db: None,
        },
        RouterOptions {
            allowed_origins: parse_allowed_origins(allowed),
            ..RouterOptions::default()
        },
    )
}

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/landmarks/identify")
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_default_origin_is_allowed() {
    let response = router(None)
        .oneshot(preflight("http://localhost:5173"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:5173"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "3600");

    let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
    assert!(methods.contains("POST"));
    assert!(methods.contains("GET"));
    assert!(!methods.contains("DELETE"));
    assert!(!methods.contains("PUT"));
}

#[tokio::test]
async fn test_unknown_origin_gets_no_allow_header() {
    let response = router(None)
        .oneshot(preflight("https://evil.example.com"))
        .await
        .unwrap();

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_configured_origins_replace_defaults() {
    let app = router(Some("https://play.example.com"));

    let response = app
        .clone()
        .oneshot(preflight("https://play.example.com"))
        .await
        .unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://play.example.com"
    );

    let response = app.oneshot(preflight("http://localhost:5173")).await.unwrap();
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_simple_request_echoes_origin_not_wildcard() {
    let response = router(Some("*,https://play.example.com"))
        .oneshot(
            Request::builder()
                .uri("/api/v1/landmarks")
                .header(header::ORIGIN, "https://play.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let allow = &response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN];
    assert_eq!(allow, "https://play.example.com");
    assert_ne!(allow, "*");
}
