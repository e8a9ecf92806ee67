//! Nearest-landmark selection.
//!
//! Given a user position and the known landmarks, find the closest landmark
//! whose own detection radius contains the user. A landmark that is closer
//! but outside its radius is not a candidate.
//!
//! The selector is a single linear scan recomputing every distance. It
//! holds no state and can be called concurrently.

use serde::Serialize;
use tracing::trace;

use crate::geo::{round_distance, round_distance_within};
use crate::models::{Coordinate, Landmark};

/// The landmark a user is standing at, with the rounded distance to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandmarkMatch<'a> {
    pub landmark: &'a Landmark,
    /// Distance in meters rounded to two decimals. Captures store this value.
    pub distance_meters: f64,
}

/// One entry of [`rank_landmarks_by_distance`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedLandmark<'a> {
    pub landmark: &'a Landmark,
    pub distance_meters: f64,
    /// Whether the user is inside this landmark's detection radius.
    pub in_range: bool,
}

/// Find the nearest landmark that has `user` inside its detection radius.
///
/// Returns `None` when the list is empty or no landmark is in range. On
/// equal distances the landmark seen first wins.
pub fn find_nearest_landmark<'a>(
    user: &Coordinate,
    landmarks: &'a [Landmark],
) -> Option<LandmarkMatch<'a>> {
    let mut best: Option<(&'a Landmark, f64)> = None;

    for landmark in landmarks {
        let distance = user.distance_to(&landmark.coordinate());
        let radius = landmark.detection_radius();
        trace!(
            subsystem = "matcher",
            landmark_id = %landmark.id,
            distance_m = distance,
            radius_m = radius,
            "Evaluated landmark"
        );

        if distance > radius {
            continue;
        }
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((landmark, distance)),
        }
    }

    best.map(|(landmark, distance)| LandmarkMatch {
        landmark,
        distance_meters: round_distance_within(distance, landmark.detection_radius()),
    })
}

/// Every landmark with its distance from `user`, nearest first.
///
/// The sort is stable, so equal distances keep input order.
pub fn rank_landmarks_by_distance<'a>(
    user: &Coordinate,
    landmarks: &'a [Landmark],
) -> Vec<RankedLandmark<'a>> {
    let mut ranked: Vec<(f64, &'a Landmark)> = landmarks
        .iter()
        .map(|l| (user.distance_to(&l.coordinate()), l))
        .collect();
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0));

    ranked
        .into_iter()
        .map(|(distance, landmark)| {
            let radius = landmark.detection_radius();
            let in_range = distance <= radius;
            RankedLandmark {
                landmark,
                distance_meters: if in_range {
                    round_distance_within(distance, radius)
                } else {
                    round_distance(distance)
                },
                in_range,
            }
        })
        .collect()
}
