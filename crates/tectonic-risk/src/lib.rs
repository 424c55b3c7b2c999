//! Tectonic Earthquake Risk Scoring
//!
//! Combines distance to hand-coded plate boundary points, a fixed volcano
//! catalogue and linear plate-motion projection into a heuristic earthquake
//! risk score for a single geographic point.
//!
//! # Pipeline
//!
//! ```text
//! reference tables -> distance engine -> scorer (+ projection context) -> score + label
//! ```
//!
//! # Scoring Model
//!
//! | Factor | Basic | Integrated | Description |
//! |--------|-------|------------|-------------|
//! | M      | 1/5   | 0.25       | Magnitude / 10 |
//! | D      | 1/5   | 0.15       | Shallow depth (50 km horizon) |
//! | B      | 1/5   | 0.20       | Plate boundary proximity (500 km horizon) |
//! | T      | 1/5   | 0.15       | Tectonic stress index / 50 |
//! | V      | 1/5   | 0.10       | Volcanic influence / 5 |
//! | C      | -     | 0.10       | Collision zone proximity (1000 km horizon) |
//! | S      | -     | 0.05       | Local stress accumulation / 100 |
//!
//! Every factor is clamped to `[0, 1]`, so the overall score is too.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use thiserror::Error;

pub mod config;
pub mod distance;
pub mod estimate;
pub mod export;
pub mod features;
pub mod loader;
pub mod projection;
pub mod reference;
pub mod report;
pub mod scorer;

pub use config::{ProjectionConfig, ScorerConfig, Settings};
pub use distance::{NearestBoundary, NearestVolcano, VolcanicInfluence};
pub use projection::{CollisionZone, Hotspot, PlateProjection, ProjectionContext, StressGrid};
pub use reference::{BoundaryPoint, BoundaryType, Plate, PlateMotion, ReferenceData, Volcano, VolcanoStatus};
pub use scorer::{AssessmentContext, QueryPoint, RiskAssessment, ScoringVariant};

/// Mean Earth radius in km
pub const EARTH_RADIUS_KM: f64 = 6371.000000000;

/// Year the bundled volcano catalogue was compiled; eruption recency is measured from here
pub const DATASET_REFERENCE_YEAR: i32 = 2024;

#[derive(Error, Debug)]
pub enum RiskError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Reference data contains no {0}")]
    EmptyReference(&'static str),
    #[error("Grid resolution must be at least 0.1 degrees, got {0}")]
    InvalidResolution(f64),
    #[error("Risk thresholds must be finite and strictly descending: {0:?}")]
    InvalidThresholds(Vec<f64>),
}

pub type Result<T> = std::result::Result<T, RiskError>;

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Great-circle distance to another point in km
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        haversine_km(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}°N, {:.4}°E", self.latitude, self.longitude)
    }
}

/// Ordinal risk category, lowest severity first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "LOW")]
    Low,
    #[serde(rename = "MODERATE")]
    Moderate,
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "VERY HIGH")]
    VeryHigh,
    #[serde(rename = "EXTREME")]
    Extreme,
}

impl RiskLevel {
    /// Severity of an accumulated stress value from the global stress grid
    pub fn from_stress(stress: f64) -> Self {
        if stress > 100.000000000 {
            RiskLevel::Extreme
        } else if stress > 75.000000000 {
            RiskLevel::VeryHigh
        } else if stress > 50.000000000 {
            RiskLevel::High
        } else if stress > 25.000000000 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Moderate => "MODERATE",
            RiskLevel::High => "HIGH",
            RiskLevel::VeryHigh => "VERY HIGH",
            RiskLevel::Extreme => "EXTREME",
        }
    }

    /// Operational recommendation attached to each category
    pub fn recommendation(&self) -> &'static str {
        match self {
            RiskLevel::Low => "ROUTINE MONITORING",
            RiskLevel::Moderate => "STANDARD PRECAUTIONS",
            RiskLevel::High => "INCREASED MONITORING REQUIRED",
            RiskLevel::VeryHigh => "HIGH ALERT - PREPARE FOR EVACUATION",
            RiskLevel::Extreme => "IMMEDIATE EVACUATION RECOMMENDED",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Haversine distance between two points in km
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1 * PI / 180.000000000;
    let lat2_rad = lat2 * PI / 180.000000000;
    let dlat = (lat2 - lat1) * PI / 180.000000000;
    let dlon = (lon2 - lon1) * PI / 180.000000000;

    let a = (dlat / 2.000000000).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.000000000).sin().powi(2);
    let c = 2.000000000 * a.sqrt().atan2((1.000000000 - a).sqrt());

    EARTH_RADIUS_KM * c
}
