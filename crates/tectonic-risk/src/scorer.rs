//! Risk scoring for a single point
//!
//! Two variants share the same factor definitions:
//!
//! - **Basic**: arithmetic mean of the five geological factors
//!   (M, D, B, T, V), labelled VERY HIGH / HIGH / MODERATE / LOW.
//! - **Integrated**: weighted sum of all seven factors including the two
//!   projection factors (C, S), labelled EXTREME down to LOW.
//!
//! Scoring never fails. Missing magnitude or depth fall back to the
//! configured defaults, missing reference data yields zero-valued factors.

use crate::config::ScorerConfig;
use crate::distance::{self, NearestBoundary, VolcanicInfluence};
use crate::projection::{CollisionZone, ProjectionContext};
use crate::reference::ReferenceData;
use crate::{GeoPoint, RiskLevel};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Boundary distance horizon (km)
const BOUNDARY_HORIZON_KM: f64 = 500.000000000;

/// Depths at or beyond this add no risk (km)
const SHALLOW_HORIZON_KM: f64 = 50.000000000;

/// Stress index that saturates the tectonic stress factor
const STRESS_SATURATION: f64 = 50.000000000;

/// Volcanic index that saturates the volcanic factor
const VOLCANIC_SATURATION: f64 = 5.000000000;

/// Collision zone horizon (km)
const COLLISION_HORIZON_KM: f64 = 1000.000000000;

/// Local stress that saturates the accumulation factor
const ACCUMULATION_SATURATION: f64 = 100.000000000;

/// Fixed data-quality ratings behind the confidence assessment
const DATA_QUALITY: [(&str, f64); 4] = [
    ("Geological Data Availability", 0.850000000),
    ("Tectonic Model Reliability", 0.800000000),
    ("Volcanic Data Completeness", 0.750000000),
    ("Historical Data Coverage", 0.700000000),
];

/// Clamp to [0, 1], mapping NaN to 0
fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// A point to assess
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub magnitude: Option<f64>,
    pub depth_km: Option<f64>,
}

impl QueryPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            magnitude: None,
            depth_km: None,
        }
    }

    pub fn with_magnitude(mut self, magnitude: f64) -> Self {
        self.magnitude = Some(magnitude);
        self
    }

    pub fn with_depth(mut self, depth_km: f64) -> Self {
        self.depth_km = Some(depth_km);
        self
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Scoring formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringVariant {
    Basic,
    Integrated,
}

impl ScoringVariant {
    /// Map an overall score to a category (strictly-greater thresholds)
    pub fn classify(&self, overall_risk: f64, config: &ScorerConfig) -> RiskLevel {
        match self {
            ScoringVariant::Basic => {
                let [very_high, high, moderate] = config.basic_thresholds;
                if overall_risk > very_high {
                    RiskLevel::VeryHigh
                } else if overall_risk > high {
                    RiskLevel::High
                } else if overall_risk > moderate {
                    RiskLevel::Moderate
                } else {
                    RiskLevel::Low
                }
            }
            ScoringVariant::Integrated => {
                let [extreme, very_high, high, moderate] = config.integrated_thresholds;
                if overall_risk > extreme {
                    RiskLevel::Extreme
                } else if overall_risk > very_high {
                    RiskLevel::VeryHigh
                } else if overall_risk > high {
                    RiskLevel::High
                } else if overall_risk > moderate {
                    RiskLevel::Moderate
                } else {
                    RiskLevel::Low
                }
            }
        }
    }
}

impl fmt::Display for ScoringVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringVariant::Basic => f.write_str("basic"),
            ScoringVariant::Integrated => f.write_str("integrated"),
        }
    }
}

impl FromStr for ScoringVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(ScoringVariant::Basic),
            "integrated" => Ok(ScoringVariant::Integrated),
            other => Err(format!("unknown scoring variant '{}' (expected basic or integrated)", other)),
        }
    }
}

/// Named risk factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    Magnitude,
    Depth,
    BoundaryProximity,
    TectonicStress,
    VolcanicActivity,
    CollisionProximity,
    StressAccumulation,
}

impl FactorKind {
    pub fn label(&self) -> &'static str {
        match self {
            FactorKind::Magnitude => "Magnitude Factor",
            FactorKind::Depth => "Depth Factor",
            FactorKind::BoundaryProximity => "Plate Boundary Proximity",
            FactorKind::TectonicStress => "Tectonic Stress",
            FactorKind::VolcanicActivity => "Volcanic Activity",
            FactorKind::CollisionProximity => "Collision Zone Proximity",
            FactorKind::StressAccumulation => "Stress Accumulation",
        }
    }
}

/// One factor of the breakdown
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub kind: FactorKind,
    /// Normalised value in [0, 1]
    pub value: f64,
    pub weight: f64,
}

impl RiskFactor {
    pub fn contribution(&self) -> f64 {
        self.value * self.weight
    }
}

/// Geological context behind the core factors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeologicalContext {
    pub nearest_boundary: Option<NearestBoundary>,
    /// Boundary stress index, 0 without a boundary
    pub stress_index: f64,
    pub volcanic: VolcanicInfluence,
}

impl GeologicalContext {
    pub fn boundary_distance_km(&self) -> Option<f64> {
        self.nearest_boundary.as_ref().map(|b| b.distance_km)
    }
}

/// Projection-derived context for the integrated variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub years: f64,
    pub nearest_collision: Option<CollisionZone>,
    pub collision_distance_km: Option<f64>,
    pub local_stress: f64,
    pub nearest_hotspot_km: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfidenceLevel {
    Low,
    Moderate,
    High,
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceLevel::Low => f.write_str("LOW"),
            ConfidenceLevel::Moderate => f.write_str("MODERATE"),
            ConfidenceLevel::High => f.write_str("HIGH"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQuality {
    pub name: String,
    pub score: f64,
}

/// Confidence in an integrated assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Confidence {
    pub factors: Vec<DataQuality>,
    pub score: f64,
    pub level: ConfidenceLevel,
}

impl Confidence {
    pub fn assess() -> Self {
        let factors: Vec<DataQuality> = DATA_QUALITY
            .iter()
            .map(|&(name, score)| DataQuality {
                name: name.to_string(),
                score,
            })
            .collect();
        let score = factors.iter().map(|f| f.score).sum::<f64>() / factors.len() as f64;

        let level = if score > 0.800000000 {
            ConfidenceLevel::High
        } else if score > 0.600000000 {
            ConfidenceLevel::Moderate
        } else {
            ConfidenceLevel::Low
        };

        Self {
            factors,
            score,
            level,
        }
    }
}

/// Full result of one assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub location: GeoPoint,
    pub magnitude: f64,
    pub depth_km: f64,
    pub variant: ScoringVariant,
    pub overall_risk: f64,
    pub risk_level: RiskLevel,
    pub recommendation: String,
    pub factors: Vec<RiskFactor>,
    pub geology: GeologicalContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<ProjectionSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
}

impl RiskAssessment {
    pub fn factor(&self, kind: FactorKind) -> Option<f64> {
        self.factors.iter().find(|f| f.kind == kind).map(|f| f.value)
    }
}

/// Everything a scoring call reads: reference tables, settings and an
/// optional projection built for the integrated variant
#[derive(Debug, Clone)]
pub struct AssessmentContext {
    pub reference: ReferenceData,
    pub config: ScorerConfig,
    pub projection: Option<ProjectionContext>,
}

impl AssessmentContext {
    pub fn new(reference: ReferenceData, config: ScorerConfig) -> Self {
        Self {
            reference,
            config,
            projection: None,
        }
    }

    pub fn with_projection(mut self, projection: ProjectionContext) -> Self {
        self.projection = Some(projection);
        self
    }

    /// Boundary, stress and volcanic context for a point
    pub fn geology(&self, point: &GeoPoint) -> GeologicalContext {
        let nearest_boundary = distance::nearest_boundary(&self.reference, point);
        let stress_index = nearest_boundary
            .as_ref()
            .map(NearestBoundary::stress_index)
            .unwrap_or(0.0);
        let volcanic = distance::volcanic_influence(
            &self.reference,
            point,
            self.config.volcanic_radius_km,
            self.config.reference_year,
            self.config.recent_eruption_years,
        );

        GeologicalContext {
            nearest_boundary,
            stress_index,
            volcanic,
        }
    }

    fn projection_summary(&self, point: &GeoPoint) -> Option<ProjectionSummary> {
        let projection = self.projection.as_ref()?;
        let nearest = projection.nearest_collision_zone(point);

        Some(ProjectionSummary {
            years: projection.years,
            nearest_collision: nearest.map(|(zone, _)| zone.clone()),
            collision_distance_km: nearest.map(|(_, d)| d),
            local_stress: projection.local_stress(point),
            nearest_hotspot_km: projection.nearest_hotspot_km(point),
        })
    }

    /// Score a point with the chosen variant
    ///
    /// The integrated variant scores the two projection factors as 0 when
    /// no projection context is attached.
    pub fn assess(&self, query: &QueryPoint, variant: ScoringVariant) -> RiskAssessment {
        let location = query.location();
        let magnitude = query.magnitude.unwrap_or(self.config.default_magnitude);
        let depth_km = query.depth_km.unwrap_or(self.config.default_depth_km);

        let geology = self.geology(&location);

        let magnitude_factor = unit(magnitude / 10.000000000);
        let depth_factor = unit((SHALLOW_HORIZON_KM - depth_km) / SHALLOW_HORIZON_KM);
        let boundary_factor = geology
            .boundary_distance_km()
            .map(|d| unit((BOUNDARY_HORIZON_KM - d) / BOUNDARY_HORIZON_KM))
            .unwrap_or(0.0);
        let stress_factor = unit(geology.stress_index / STRESS_SATURATION);
        let volcanic_factor = unit(geology.volcanic.index / VOLCANIC_SATURATION);

        let core = [
            (FactorKind::Magnitude, magnitude_factor),
            (FactorKind::Depth, depth_factor),
            (FactorKind::BoundaryProximity, boundary_factor),
            (FactorKind::TectonicStress, stress_factor),
            (FactorKind::VolcanicActivity, volcanic_factor),
        ];

        let (factors, projection, confidence) = match variant {
            ScoringVariant::Basic => {
                let weight = 1.000000000 / core.len() as f64;
                let factors: Vec<RiskFactor> = core
                    .iter()
                    .map(|&(kind, value)| RiskFactor { kind, value, weight })
                    .collect();
                (factors, None, None)
            }
            ScoringVariant::Integrated => {
                let summary = self.projection_summary(&location);

                let collision_factor = summary
                    .as_ref()
                    .and_then(|s| s.collision_distance_km)
                    .map(|d| unit((COLLISION_HORIZON_KM - d) / COLLISION_HORIZON_KM))
                    .unwrap_or(0.0);
                let accumulation_factor = summary
                    .as_ref()
                    .map(|s| unit(s.local_stress / ACCUMULATION_SATURATION))
                    .unwrap_or(0.0);

                let w = &self.config.weights;
                let factors = vec![
                    RiskFactor { kind: FactorKind::Magnitude, value: magnitude_factor, weight: w.magnitude },
                    RiskFactor { kind: FactorKind::Depth, value: depth_factor, weight: w.depth },
                    RiskFactor { kind: FactorKind::BoundaryProximity, value: boundary_factor, weight: w.boundary_proximity },
                    RiskFactor { kind: FactorKind::TectonicStress, value: stress_factor, weight: w.tectonic_stress },
                    RiskFactor { kind: FactorKind::VolcanicActivity, value: volcanic_factor, weight: w.volcanic_activity },
                    RiskFactor { kind: FactorKind::CollisionProximity, value: collision_factor, weight: w.collision_proximity },
                    RiskFactor { kind: FactorKind::StressAccumulation, value: accumulation_factor, weight: w.stress_accumulation },
                ];
                (factors, summary, Some(Confidence::assess()))
            }
        };

        let overall_risk = unit(factors.iter().map(RiskFactor::contribution).sum::<f64>());
        let risk_level = variant.classify(overall_risk, &self.config);

        debug!(
            "Assessed {} ({}): {:.3} {} (M={:.2}, D={:.2}, B={:.2}, T={:.2}, V={:.2})",
            location,
            variant,
            overall_risk,
            risk_level,
            magnitude_factor,
            depth_factor,
            boundary_factor,
            stress_factor,
            volcanic_factor
        );

        RiskAssessment {
            location,
            magnitude,
            depth_km,
            variant,
            overall_risk,
            risk_level,
            recommendation: risk_level.recommendation().to_string(),
            factors,
            geology,
            projection,
            confidence,
        }
    }
}

/// A named demonstration location with nominal magnitude and depth
#[derive(Debug, Clone, Copy)]
pub struct SampleLocation {
    pub name: &'static str,
    pub query: QueryPoint,
}

const fn sample(name: &'static str, lat: f64, lon: f64, magnitude: f64, depth_km: f64) -> SampleLocation {
    SampleLocation {
        name,
        query: QueryPoint {
            latitude: lat,
            longitude: lon,
            magnitude: Some(magnitude),
            depth_km: Some(depth_km),
        },
    }
}

/// Well-known high-risk locations
pub const SAMPLE_LOCATIONS: [SampleLocation; 6] = [
    sample("San Francisco (San Andreas Fault)", 37.774900000, -122.419400000, 7.5, 12.0),
    sample("Tokyo (Ring of Fire)", 35.676200000, 139.650300000, 8.0, 30.0),
    sample("Istanbul (North Anatolian Fault)", 41.008200000, 28.978400000, 7.2, 15.0),
    sample("Los Angeles", 34.052200000, -118.243700000, 6.5, 15.0),
    sample("Reykjavik (Mid-Atlantic Ridge)", 64.146600000, -21.942600000, 6.0, 8.0),
    sample("Kathmandu (Himalayan Front)", 27.717200000, 85.324000000, 7.8, 18.0),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectionConfig;

    fn make_context() -> AssessmentContext {
        AssessmentContext::new(ReferenceData::builtin().unwrap(), ScorerConfig::default())
    }

    fn make_integrated_context() -> AssessmentContext {
        let context = make_context();
        let projection =
            ProjectionContext::build(&context.reference, &ProjectionConfig::default()).unwrap();
        context.with_projection(projection)
    }

    #[test]
    fn test_kilauea_assessment() {
        let context = make_context();
        let query = QueryPoint::new(19.42, -155.29);

        let result = context.assess(&query, ScoringVariant::Basic);

        let nearest = result.geology.volcanic.nearest_distance_km().unwrap();
        assert!(nearest < 1.0, "Nearest volcano: {} km", nearest);
        assert!(result.geology.volcanic.active_nearby >= 1);
        assert_eq!(result.magnitude, 6.0);
        assert_eq!(result.depth_km, 15.0);
    }

    #[test]
    fn test_null_island_uses_true_boundary_distance() {
        let context = make_context();
        let result = context.assess(&QueryPoint::new(0.0, 0.0), ScoringVariant::Basic);

        let d = result.geology.boundary_distance_km().unwrap();
        assert!(d > 2000.0, "Boundary distance: {}", d);
        assert_eq!(result.factor(FactorKind::BoundaryProximity), Some(0.0));
    }

    #[test]
    fn test_basic_is_mean_of_core_factors() {
        let context = make_context();
        let query = QueryPoint::new(35.6762, 139.6503).with_magnitude(7.2).with_depth(25.0);

        let result = context.assess(&query, ScoringVariant::Basic);
        assert_eq!(result.factors.len(), 5);

        let mean = result.factors.iter().map(|f| f.value).sum::<f64>() / 5.0;
        assert!((result.overall_risk - mean).abs() < 1e-12);
        assert!((result.factor(FactorKind::Magnitude).unwrap() - 0.72).abs() < 1e-12);
        assert!((result.factor(FactorKind::Depth).unwrap() - 0.5).abs() < 1e-12);
        assert!(result.confidence.is_none());
        assert!(result.projection.is_none());
    }

    #[test]
    fn test_factors_are_clamped() {
        let context = make_context();
        let query = QueryPoint::new(28.0, 85.0).with_magnitude(14.0).with_depth(-30.0);

        for variant in [ScoringVariant::Basic, ScoringVariant::Integrated] {
            let result = context.assess(&query, variant);
            for f in &result.factors {
                assert!((0.0..=1.0).contains(&f.value), "{:?} = {}", f.kind, f.value);
            }
            assert_eq!(result.factor(FactorKind::Magnitude), Some(1.0));
            assert_eq!(result.factor(FactorKind::Depth), Some(1.0));
            // On a boundary point: stress index saturates
            assert_eq!(result.factor(FactorKind::TectonicStress), Some(1.0));
        }

        let deep = QueryPoint::new(0.0, 0.0).with_magnitude(-2.0).with_depth(700.0);
        let result = context.assess(&deep, ScoringVariant::Basic);
        assert_eq!(result.factor(FactorKind::Magnitude), Some(0.0));
        assert_eq!(result.factor(FactorKind::Depth), Some(0.0));
    }

    #[test]
    fn test_integrated_weights_and_confidence() {
        let context = make_integrated_context();
        let query = QueryPoint::new(37.7749, -122.4194).with_magnitude(7.5).with_depth(12.0);

        let result = context.assess(&query, ScoringVariant::Integrated);
        assert_eq!(result.factors.len(), 7);

        let weight_sum: f64 = result.factors.iter().map(|f| f.weight).sum();
        assert!((weight_sum - 1.0).abs() < 1e-9);

        let weighted: f64 = result.factors.iter().map(|f| f.value * f.weight).sum();
        assert!((result.overall_risk - weighted).abs() < 1e-12);

        let confidence = result.confidence.unwrap();
        assert!((confidence.score - 0.775).abs() < 1e-9);
        assert_eq!(confidence.level, ConfidenceLevel::Moderate);
        assert!(result.projection.is_some());
        assert_eq!(result.recommendation, result.risk_level.recommendation());
    }

    #[test]
    fn test_integrated_without_projection() {
        let context = make_context();
        let result = context.assess(&QueryPoint::new(41.0082, 28.9784), ScoringVariant::Integrated);

        assert_eq!(result.factor(FactorKind::CollisionProximity), Some(0.0));
        assert_eq!(result.factor(FactorKind::StressAccumulation), Some(0.0));
    }

    #[test]
    fn test_empty_reference_scores_zero_geology() {
        let context = AssessmentContext::new(ReferenceData::default(), ScorerConfig::default());
        let result = context.assess(&QueryPoint::new(10.0, 10.0), ScoringVariant::Basic);

        assert!(result.geology.nearest_boundary.is_none());
        assert_eq!(result.geology.stress_index, 0.0);
        assert_eq!(result.factor(FactorKind::BoundaryProximity), Some(0.0));
        assert_eq!(result.factor(FactorKind::VolcanicActivity), Some(0.0));
    }

    #[test]
    fn test_classification_thresholds() {
        let config = ScorerConfig::default();

        assert_eq!(ScoringVariant::Basic.classify(0.71, &config), RiskLevel::VeryHigh);
        assert_eq!(ScoringVariant::Basic.classify(0.7, &config), RiskLevel::High);
        assert_eq!(ScoringVariant::Basic.classify(0.31, &config), RiskLevel::Moderate);
        assert_eq!(ScoringVariant::Basic.classify(0.3, &config), RiskLevel::Low);
        assert_eq!(ScoringVariant::Basic.classify(1.0, &config), RiskLevel::VeryHigh);

        assert_eq!(ScoringVariant::Integrated.classify(0.81, &config), RiskLevel::Extreme);
        assert_eq!(ScoringVariant::Integrated.classify(0.8, &config), RiskLevel::VeryHigh);
        assert_eq!(ScoringVariant::Integrated.classify(0.41, &config), RiskLevel::High);
        assert_eq!(ScoringVariant::Integrated.classify(0.21, &config), RiskLevel::Moderate);
        assert_eq!(ScoringVariant::Integrated.classify(0.2, &config), RiskLevel::Low);
    }

    #[test]
    fn test_nan_inputs_do_not_escape_range() {
        let context = make_context();
        let query = QueryPoint::new(0.0, 0.0).with_magnitude(f64::NAN).with_depth(f64::NAN);
        let result = context.assess(&query, ScoringVariant::Basic);
        assert!((0.0..=1.0).contains(&result.overall_risk));
    }

    #[test]
    fn test_out_of_range_coordinates_are_scored() {
        let context = make_integrated_context();

        for (lat, lon) in [(120.0, 0.0), (-95.0, 400.0), (45.0, -720.0)] {
            let query = QueryPoint::new(lat, lon);
            for variant in [ScoringVariant::Basic, ScoringVariant::Integrated] {
                let result = context.assess(&query, variant);
                assert!(result.overall_risk.is_finite(), "({}, {})", lat, lon);
                assert!((0.0..=1.0).contains(&result.overall_risk));
                assert_eq!(result.location, GeoPoint::new(lat, lon));
            }
        }
    }

    #[test]
    fn test_variant_parsing() {
        assert_eq!("Basic".parse::<ScoringVariant>(), Ok(ScoringVariant::Basic));
        assert_eq!("integrated".parse::<ScoringVariant>(), Ok(ScoringVariant::Integrated));
        assert!("weighted".parse::<ScoringVariant>().is_err());
    }

    #[test]
    fn test_sample_locations_score() {
        let context = make_integrated_context();
        for sample in SAMPLE_LOCATIONS.iter() {
            let result = context.assess(&sample.query, ScoringVariant::Integrated);
            assert!(
                (0.0..=1.0).contains(&result.overall_risk),
                "{}: {}",
                sample.name,
                result.overall_risk
            );
        }
    }
}
