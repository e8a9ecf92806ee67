//! Request extractors for form-encoded endpoints.
//!
//! Mobile clients post coordinates either as `application/x-www-form-urlencoded`
//! or as `multipart/form-data` (when a photo is attached), so the coordinate
//! extractor accepts both.

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Form;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use waypoint_core::Coordinate;

use crate::error::ApiError;

/// Raw url-encoded coordinate fields. Kept as strings so parse failures
/// produce a field-specific message instead of a generic rejection.
#[derive(Debug, Deserialize)]
struct RawCoordinates {
    latitude: Option<String>,
    longitude: Option<String>,
}

/// Validated user position from a form body.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateForm(pub Coordinate);

#[async_trait]
impl<S> FromRequest<S> for CoordinateForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_multipart(&req) {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            let mut latitude = None;
            let mut longitude = None;
            while let Some(field) = next_field(&mut multipart).await? {
                let field_name = field.name().map(|n| n.to_string());
                match field_name.as_deref() {
                    Some("latitude") => latitude = Some(field_text(field).await?),
                    Some("longitude") => longitude = Some(field_text(field).await?),
                    _ => {}
                }
            }
            return Ok(Self(parse_coordinate(latitude, longitude)?));
        }

        let Form(raw) = Form::<RawCoordinates>::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        Ok(Self(parse_coordinate(raw.latitude, raw.longitude)?))
    }
}

/// Multipart body of a capture attempt.
///
/// # Multipart Fields
///
/// - `image` (required): JPEG photo bytes
/// - `latitude`, `longitude` (required): decimal degrees
/// - `timestamp` (optional): capture time, see [`parse_capture_timestamp`]
#[derive(Debug)]
pub struct IdentifyForm {
    pub coordinate: Coordinate,
    pub image: Bytes,
    pub timestamp: Option<DateTime<Utc>>,
}

#[async_trait]
impl<S> FromRequest<S> for IdentifyForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        let mut image = None;
        let mut latitude = None;
        let mut longitude = None;
        let mut timestamp = None;

        while let Some(field) = next_field(&mut multipart).await? {
            let field_name = field.name().map(|n| n.to_string());
            match field_name.as_deref() {
                Some("image") => {
                    let data = field.bytes().await.map_err(|e| {
                        ApiError::BadRequest(format!("Failed to read image: {}", e))
                    })?;
                    image = Some(data);
                }
                Some("latitude") => latitude = Some(field_text(field).await?),
                Some("longitude") => longitude = Some(field_text(field).await?),
                Some("timestamp") => timestamp = Some(field_text(field).await?),
                _ => {}
            }
        }

        let image = image
            .filter(|b| !b.is_empty())
            .ok_or_else(|| ApiError::BadRequest("Missing required field: image".to_string()))?;
        let coordinate = parse_coordinate(latitude, longitude)?;
        let timestamp = match timestamp {
            Some(raw) => parse_capture_timestamp(&raw).map_err(ApiError::BadRequest)?,
            None => None,
        };

        Ok(Self {
            coordinate,
            image,
            timestamp,
        })
    }
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false)
}

async fn next_field<'a>(
    multipart: &'a mut Multipart,
) -> Result<Option<axum::extract::multipart::Field<'a>>, ApiError> {
    multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {}", e)))
}

async fn field_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {}", e)))
}

fn parse_degrees(name: &str, value: Option<String>) -> Result<f64, ApiError> {
    let value = value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("Missing required field: {}", name)))?;
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| ApiError::BadRequest(format!("Invalid {}: '{}' is not a number", name, value)))
}

/// Parse and range-check a latitude/longitude pair from raw form values.
pub fn parse_coordinate(
    latitude: Option<String>,
    longitude: Option<String>,
) -> Result<Coordinate, ApiError> {
    let latitude = parse_degrees("latitude", latitude)?;
    let longitude = parse_degrees("longitude", longitude)?;
    Ok(Coordinate::new(latitude, longitude)?)
}

/// Parse a client-supplied capture timestamp.
///
/// Accepted forms:
/// - RFC 3339 (`2026-10-18T14:30:00Z`, `2026-10-18T16:30:00+02:00`)
/// - ISO 8601 without offset, taken as UTC (`2026-10-18T14:30:00`, `2026-10-18T14:30:00.250`)
/// - Unix epoch milliseconds (`1792333800000`), as sent by JavaScript `Date.now()`
/// - `now`
///
/// Blank input yields `Ok(None)`: the server clock is used.
pub fn parse_capture_timestamp(raw: &str) -> Result<Option<DateTime<Utc>>, String> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(None);
    }
    if s.eq_ignore_ascii_case("now") {
        return Ok(Some(Utc::now()));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Some(naive.and_utc()));
    }
    if let Ok(millis) = s.parse::<i64>() {
        if let Some(dt) = Utc.timestamp_millis_opt(millis).single() {
            return Ok(Some(dt));
        }
    }

    Err(format!(
        "Invalid timestamp '{}'. Expected ISO 8601 (e.g., '2026-10-18T14:30:00Z') or epoch milliseconds",
        s
    ))
}
