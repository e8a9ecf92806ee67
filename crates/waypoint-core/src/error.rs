//! Error types for waypoint.

use thiserror::Error;

/// Result type alias using waypoint's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for waypoint operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No landmark has the user inside its detection radius
    #[error("{0}")]
    OutOfRange(String),

    /// Object storage upload, lookup, or delete failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build the rejection returned when no landmark is close enough.
    pub fn out_of_range() -> Self {
        Error::OutOfRange(crate::defaults::OUT_OF_RANGE_MESSAGE.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_out_of_range() {
        let err = Error::out_of_range();
        assert!(err.to_string().starts_with("No landmarks within range"));
    }

    #[test]
    fn test_error_display_storage() {
        let err = Error::Storage("bucket missing".to_string());
        assert_eq!(err.to_string(), "Storage error: bucket missing");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("missing SUPABASE_URL".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing SUPABASE_URL");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("latitude out of range".to_string());
        assert_eq!(err.to_string(), "Invalid input: latitude out of range");
    }

    #[test]
    fn test_error_display_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::Io(io_err);
        assert!(err.to_string().contains("I/O error:"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
