//! Plausible magnitude and depth for a point, from its geological context
//!
//! | Boundary distance | Magnitude |
//! |-------------------|-----------|
//! | < 100 km          | 6.5 + 1.5 · activity |
//! | < 300 km          | 5.5 + 1.0 · activity |
//! | otherwise         | 4.5 + 0.5 · activity |
//!
//! Each active volcano within the volcanic radius adds 0.3 (up to three),
//! and the result is clamped to [3.0, 8.5]. Depth is the nominal depth of
//! the nearest boundary type.

use crate::reference::BoundaryType;
use crate::scorer::{AssessmentContext, GeologicalContext};
use crate::GeoPoint;
use serde::{Deserialize, Serialize};
use tracing::debug;

const MIN_MAGNITUDE: f64 = 3.000000000;
const MAX_MAGNITUDE: f64 = 8.500000000;
const MIN_DEPTH_KM: f64 = 1.000000000;
const MAX_DEPTH_KM: f64 = 100.000000000;

/// Estimated earthquake parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationEstimate {
    pub location: GeoPoint,
    pub magnitude: f64,
    pub depth_km: f64,
    pub plate: Option<String>,
    pub boundary_type: Option<BoundaryType>,
    pub boundary_distance_km: Option<f64>,
    pub active_volcanoes_nearby: usize,
}

fn nominal_depth_km(boundary_type: Option<BoundaryType>) -> f64 {
    match boundary_type {
        Some(BoundaryType::Convergent) => 25.000000000,
        Some(BoundaryType::Transform) => 15.000000000,
        _ => 10.000000000,
    }
}

/// Estimate from an already computed geological context
pub fn from_geology(location: GeoPoint, geology: &GeologicalContext) -> LocationEstimate {
    let boundary = geology.nearest_boundary.as_ref();
    let distance = boundary.map_or(f64::INFINITY, |b| b.distance_km);
    let activity = boundary.map_or(0.0, |b| b.point.activity);

    let base = if distance < 100.000000000 {
        6.500000000 + activity * 1.500000000
    } else if distance < 300.000000000 {
        5.500000000 + activity * 1.000000000
    } else {
        4.500000000 + activity * 0.500000000
    };

    let active = geology.volcanic.active_nearby;
    let volcanic_bonus = 0.300000000 * active.min(3) as f64;

    let boundary_type = boundary.map(|b| b.point.boundary_type);

    LocationEstimate {
        location,
        magnitude: (base + volcanic_bonus).clamp(MIN_MAGNITUDE, MAX_MAGNITUDE),
        depth_km: nominal_depth_km(boundary_type).clamp(MIN_DEPTH_KM, MAX_DEPTH_KM),
        plate: boundary.map(|b| b.plate.clone()),
        boundary_type,
        boundary_distance_km: boundary.map(|b| b.distance_km),
        active_volcanoes_nearby: active,
    }
}

/// Estimate magnitude and depth for a point
pub fn estimate_location(context: &AssessmentContext, location: GeoPoint) -> LocationEstimate {
    let geology = context.geology(&location);
    let estimate = from_geology(location, &geology);

    debug!(
        "Estimated {}: M{:.1} at {:.0} km",
        location, estimate.magnitude, estimate.depth_km
    );

    estimate
}
