//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Error returned by handlers. Every variant renders as `{"error": message}`.
#[derive(Debug)]
pub enum ApiError {
    /// Upstream or internal failure (database, object storage, I/O).
    Internal(waypoint_core::Error),
    /// Client input the request cannot proceed with, including out-of-range captures.
    BadRequest(String),
}

impl From<waypoint_core::Error> for ApiError {
    fn from(err: waypoint_core::Error) -> Self {
        match err {
            waypoint_core::Error::OutOfRange(msg) => ApiError::BadRequest(msg),
            waypoint_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "Request failed");
                err.to_string()
            }
            ApiError::BadRequest(msg) => msg,
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_core::Error;

    #[test]
    fn test_out_of_range_is_bad_request_with_message() {
        let err = ApiError::from(Error::out_of_range());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        match err {
            ApiError::BadRequest(msg) => assert!(msg.starts_with("No landmarks within range")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            ApiError::from(Error::InvalidInput("latitude".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(Error::Storage("bucket missing".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(Error::Request("connection reset".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_error_keeps_detail() {
        let response = ApiError::from(Error::Storage("bucket missing".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
