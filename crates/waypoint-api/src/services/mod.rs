//! Business logic shared by the HTTP handlers.

pub mod capture_service;

pub use capture_service::{CaptureOutcome, CaptureService, NearbyLandmark};
