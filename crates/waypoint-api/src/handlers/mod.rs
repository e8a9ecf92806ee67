//! HTTP handlers for waypoint-api.

pub mod captures;
pub mod health;
pub mod landmarks;
