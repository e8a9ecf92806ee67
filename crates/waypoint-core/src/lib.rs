//! # waypoint-core
//!
//! Core types, traits, and the landmark proximity matcher for the waypoint
//! landmark-hunting game.
//!
//! This crate holds no I/O: the Haversine distance and nearest-landmark
//! selector are pure functions, and storage is reached only through the
//! traits in [`traits`].

pub mod defaults;
pub mod error;
pub mod geo;
pub mod matcher;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use geo::{haversine_distance, round_distance, round_distance_within};
pub use matcher::{find_nearest_landmark, rank_landmarks_by_distance, LandmarkMatch, RankedLandmark};
pub use models::*;
pub use traits::*;
