//! Scoring and projection settings
//!
//! Every field has a default, so a settings file only needs the values it
//! overrides:
//!
//! ```json
//! { "scorer": { "reference_year": 2030 }, "projection": { "years": 50 } }
//! ```
//!
//! `projection` drives the integrated scorer; `report` drives the stand-alone
//! plate movement report.

use crate::projection::check_resolution;
use crate::{Result, RiskError, DATASET_REFERENCE_YEAR};
use quake_feed::FeedConfig;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Integrated scoring weights (9 decimal precision)
/// Sum = 1.000000000
pub const W_MAGNITUDE: f64 = 0.250000000;
pub const W_DEPTH: f64 = 0.150000000;
pub const W_BOUNDARY: f64 = 0.200000000;
pub const W_STRESS: f64 = 0.150000000;
pub const W_VOLCANIC: f64 = 0.100000000;
pub const W_COLLISION: f64 = 0.100000000;
pub const W_ACCUMULATION: f64 = 0.050000000;

/// Integrated labels: EXTREME, VERY HIGH, HIGH, MODERATE
pub const INTEGRATED_THRESHOLDS: [f64; 4] = [0.800000000, 0.600000000, 0.400000000, 0.200000000];

/// Basic labels: VERY HIGH, HIGH, MODERATE
pub const BASIC_THRESHOLDS: [f64; 3] = [0.700000000, 0.500000000, 0.300000000];

/// Integrated scoring weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskWeights {
    pub magnitude: f64,
    pub depth: f64,
    pub boundary_proximity: f64,
    pub tectonic_stress: f64,
    pub volcanic_activity: f64,
    pub collision_proximity: f64,
    pub stress_accumulation: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            magnitude: W_MAGNITUDE,
            depth: W_DEPTH,
            boundary_proximity: W_BOUNDARY,
            tectonic_stress: W_STRESS,
            volcanic_activity: W_VOLCANIC,
            collision_proximity: W_COLLISION,
            stress_accumulation: W_ACCUMULATION,
        }
    }
}

impl RiskWeights {
    pub fn sum(&self) -> f64 {
        self.magnitude
            + self.depth
            + self.boundary_proximity
            + self.tectonic_stress
            + self.volcanic_activity
            + self.collision_proximity
            + self.stress_accumulation
    }
}

/// Scorer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    pub weights: RiskWeights,
    /// Lower bounds for EXTREME, VERY HIGH, HIGH, MODERATE (integrated variant)
    pub integrated_thresholds: [f64; 4],
    /// Lower bounds for VERY HIGH, HIGH, MODERATE (basic variant)
    pub basic_thresholds: [f64; 3],
    /// Year that eruption recency is measured against
    pub reference_year: i32,
    /// Volcanoes beyond this radius contribute nothing
    pub volcanic_radius_km: f64,
    /// Active volcanoes must have erupted within this many years to add influence
    pub recent_eruption_years: i64,
    pub default_magnitude: f64,
    pub default_depth_km: f64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            weights: RiskWeights::default(),
            integrated_thresholds: INTEGRATED_THRESHOLDS,
            basic_thresholds: BASIC_THRESHOLDS,
            reference_year: DATASET_REFERENCE_YEAR,
            volcanic_radius_km: 500.000000000,
            recent_eruption_years: 50,
            default_magnitude: 6.000000000,
            default_depth_km: 15.000000000,
        }
    }
}

impl ScorerConfig {
    /// Reject threshold tables that would make labels non-monotonic
    pub fn validate(&self) -> Result<()> {
        check_descending(&self.integrated_thresholds)?;
        check_descending(&self.basic_thresholds)
    }
}

fn check_descending(thresholds: &[f64]) -> Result<()> {
    let finite = thresholds.iter().all(|t| t.is_finite());
    let descending = thresholds.windows(2).all(|w| w[0] > w[1]);
    if finite && descending {
        Ok(())
    } else {
        Err(RiskError::InvalidThresholds(thresholds.to_vec()))
    }
}

/// Plate projection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Projection horizon
    pub years: f64,
    /// Stress grid step in degrees
    pub resolution_deg: f64,
    /// Cells must exceed this stress to count as hotspots
    pub hotspot_threshold: f64,
}

impl Default for ProjectionConfig {
    /// Horizon used by the integrated scorer
    fn default() -> Self {
        Self {
            years: 100.000000000,
            resolution_deg: 5.000000000,
            hotspot_threshold: 10.000000000,
        }
    }
}

impl ProjectionConfig {
    /// Finer grid and higher threshold used by the stand-alone projection report
    pub fn report() -> Self {
        Self {
            years: 100.000000000,
            resolution_deg: 2.000000000,
            hotspot_threshold: 50.000000000,
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_resolution(self.resolution_deg)
    }
}

/// All settings, as read from a `--config` file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub scorer: ScorerConfig,
    pub projection: ProjectionConfig,
    pub report: ProjectionConfig,
    pub feed: FeedConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scorer: ScorerConfig::default(),
            projection: ProjectionConfig::default(),
            report: ProjectionConfig::report(),
            feed: FeedConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file and validate them
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading settings from {:?}", path);

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let settings: Settings = serde_json::from_reader(reader)?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        self.scorer.validate()?;
        self.projection.validate()?;
        self.report.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_weights_sum_to_one() {
        let sum = RiskWeights::default().sum();
        assert!((sum - 1.0).abs() < 1e-9, "Weights sum to {}", sum);
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
        assert!(ProjectionConfig::report().validate().is_ok());
    }

    #[test]
    fn test_partial_settings_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"scorer": {"reference_year": 2030}, "projection": {"years": 50}}"#)
            .unwrap();

        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.scorer.reference_year, 2030);
        assert_eq!(settings.scorer.default_magnitude, 6.0);
        assert_eq!(settings.projection.years, 50.0);
        assert_eq!(settings.projection.resolution_deg, 5.0);
        assert_eq!(settings.feed.days_back, 30);
    }

    #[test]
    fn test_report_defaults_survive_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"scorer": {"reference_year": 2030}}"#).unwrap();

        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.report, ProjectionConfig::report());
        assert_eq!(settings.projection, ProjectionConfig::default());
    }

    #[test]
    fn test_report_section_overrides() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"report": {"hotspot_threshold": 75}}"#).unwrap();

        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.report.hotspot_threshold, 75.0);
        assert_eq!(settings.report.resolution_deg, 2.0);
    }

    #[test]
    fn test_non_descending_thresholds_rejected() {
        let config = ScorerConfig {
            basic_thresholds: [0.3, 0.5, 0.7],
            ..ScorerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(RiskError::InvalidThresholds(_))
        ));
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let config = ProjectionConfig {
            resolution_deg: 0.0,
            ..ProjectionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(RiskError::InvalidResolution(_))
        ));
    }

    #[test]
    fn test_tiny_resolution_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"report": {"resolution_deg": 1e-9}}"#).unwrap();

        assert!(matches!(
            Settings::load(file.path()),
            Err(RiskError::InvalidResolution(_))
        ));
    }
}
