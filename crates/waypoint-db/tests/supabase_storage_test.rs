//! Supabase Storage backend against a mocked HTTP server.

use waypoint_db::{Error, ObjectStore, SupabaseObjectStore};
use wiremock::matchers::{body_bytes, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OBJECT_PATH: &str = "/storage/v1/object/game-assets/landmark-captures/photo.jpg";

async fn store(server: &MockServer) -> SupabaseObjectStore {
    SupabaseObjectStore::new(&server.uri(), "service-key", "game-assets").unwrap()
}

#[tokio::test]
async fn test_upload_sends_bytes_with_auth_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(OBJECT_PATH))
        .and(header("authorization", "Bearer service-key"))
        .and(header("apikey", "service-key"))
        .and(header("content-type", "image/jpeg"))
        .and(body_bytes(b"jpeg-data".to_vec()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Key": "game-assets/landmark-captures/photo.jpg"
        })))
        .expect(1)
        .mount(&server)
        .await;

    store(&server)
        .await
        .upload("landmark-captures/photo.jpg", b"jpeg-data", "image/jpeg")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_upload_failure_is_storage_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(OBJECT_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("Bucket not found"))
        .mount(&server)
        .await;

    let err = store(&server)
        .await
        .upload("landmark-captures/photo.jpg", b"jpeg-data", "image/jpeg")
        .await
        .unwrap_err();
    match err {
        Error::Storage(msg) => assert!(msg.contains("Bucket not found")),
        other => panic!("expected storage error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_delete_treats_missing_object_as_done() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(OBJECT_PATH))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    store(&server)
        .await
        .delete("landmark-captures/photo.jpg")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_public_url_uses_public_route() {
    let server = MockServer::start().await;
    let url = store(&server).await.public_url("landmark-captures/photo.jpg");
    assert_eq!(
        url,
        format!(
            "{}/storage/v1/object/public/game-assets/landmark-captures/photo.jpg",
            server.uri()
        )
    );
}
