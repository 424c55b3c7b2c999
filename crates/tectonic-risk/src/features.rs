//! Per-point geological feature rows
//!
//! Rows are keyed by column name so callers can request any ordered subset.
//! Columns this crate does not compute are filled with 0.

use crate::projection::PlateProjection;
use crate::reference::BoundaryType;
use crate::scorer::AssessmentContext;
use crate::GeoPoint;
use quake_feed::SeismicEvent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Plates further than this from a point exert no influence (km)
const PLATE_INFLUENCE_RADIUS_KM: f64 = 3000.000000000;

/// Every column a [`FeatureRow`] can supply, in default order
pub const FEATURE_COLUMNS: [&str; 16] = [
    "magnitude",
    "depth",
    "latitude",
    "longitude",
    "plate_boundary_distance",
    "plate_stress",
    "plate_movement_rate",
    "boundary_type_convergent",
    "boundary_type_transform",
    "boundary_type_divergent",
    "volcanic_risk_index",
    "nearest_volcano_distance",
    "active_volcanoes_nearby",
    "dominant_plate_distance",
    "dominant_plate_velocity",
    "plate_influence_factor",
];

/// Nearest moving plate by current centre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DominantPlate {
    pub plate: String,
    pub distance_km: f64,
    pub speed_cm_yr: f64,
}

impl DominantPlate {
    /// `max(0, (3000 - d)/3000) · speed/1000`
    pub fn influence(&self) -> f64 {
        ((PLATE_INFLUENCE_RADIUS_KM - self.distance_km) / PLATE_INFLUENCE_RADIUS_KM).max(0.0)
            * (self.speed_cm_yr / 1000.000000000)
    }
}

pub fn dominant_plate(projections: &[PlateProjection], point: &GeoPoint) -> Option<DominantPlate> {
    let mut best: Option<DominantPlate> = None;
    for p in projections {
        let distance_km = point.distance_km(&p.current_center);
        if best.as_ref().map_or(true, |b| distance_km < b.distance_km) {
            best = Some(DominantPlate {
                plate: p.plate.clone(),
                distance_km,
                speed_cm_yr: p.speed_cm_yr,
            });
        }
    }
    best
}

/// Geological features for one point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub magnitude: f64,
    pub depth_km: f64,
    pub latitude: f64,
    pub longitude: f64,
    /// None when the reference data has no boundaries
    pub plate_boundary_distance_km: Option<f64>,
    pub plate_stress: f64,
    pub plate_movement_rate: f64,
    pub boundary_type: Option<BoundaryType>,
    pub volcanic_risk_index: f64,
    pub nearest_volcano_distance_km: Option<f64>,
    pub active_volcanoes_nearby: usize,
    pub dominant_plate: Option<DominantPlate>,
}

impl FeatureRow {
    fn one_hot(&self, kind: BoundaryType) -> f64 {
        if self.boundary_type == Some(kind) {
            1.0
        } else {
            0.0
        }
    }

    /// Value of a named column; missing distances read as 0
    pub fn get(&self, column: &str) -> Option<f64> {
        let value = match column {
            "magnitude" => self.magnitude,
            "depth" => self.depth_km,
            "latitude" => self.latitude,
            "longitude" => self.longitude,
            "plate_boundary_distance" => self.plate_boundary_distance_km.unwrap_or(0.0),
            "plate_stress" => self.plate_stress,
            "plate_movement_rate" => self.plate_movement_rate,
            "boundary_type_convergent" => self.one_hot(BoundaryType::Convergent),
            "boundary_type_transform" => self.one_hot(BoundaryType::Transform),
            "boundary_type_divergent" => self.one_hot(BoundaryType::Divergent),
            "volcanic_risk_index" => self.volcanic_risk_index,
            "nearest_volcano_distance" => self.nearest_volcano_distance_km.unwrap_or(0.0),
            "active_volcanoes_nearby" => self.active_volcanoes_nearby as f64,
            "dominant_plate_distance" => self.dominant_plate.as_ref().map_or(0.0, |d| d.distance_km),
            "dominant_plate_velocity" => self.dominant_plate.as_ref().map_or(0.0, |d| d.speed_cm_yr),
            "plate_influence_factor" => self.dominant_plate.as_ref().map_or(0.0, DominantPlate::influence),
            _ => return None,
        };
        Some(value)
    }
}

/// Feature row for a point with a given magnitude and depth
pub fn extract(
    context: &AssessmentContext,
    projections: &[PlateProjection],
    point: &GeoPoint,
    magnitude: f64,
    depth_km: f64,
) -> FeatureRow {
    let geology = context.geology(point);
    let boundary = geology.nearest_boundary.as_ref();

    FeatureRow {
        magnitude,
        depth_km,
        latitude: point.latitude,
        longitude: point.longitude,
        plate_boundary_distance_km: boundary.map(|b| b.distance_km),
        plate_stress: geology.stress_index,
        plate_movement_rate: boundary.map_or(0.0, |b| b.movement_rate_cm_yr),
        boundary_type: boundary.map(|b| b.point.boundary_type),
        volcanic_risk_index: geology.volcanic.index,
        nearest_volcano_distance_km: geology.volcanic.nearest_distance_km(),
        active_volcanoes_nearby: geology.volcanic.active_nearby,
        dominant_plate: dominant_plate(projections, point),
    }
}

/// Feature rows for every event of a catalogue
pub fn extract_catalogue(
    context: &AssessmentContext,
    projections: &[PlateProjection],
    events: &[SeismicEvent],
) -> Vec<FeatureRow> {
    let rows: Vec<FeatureRow> = events
        .iter()
        .map(|e| {
            extract(
                context,
                projections,
                &GeoPoint::new(e.latitude, e.longitude),
                e.magnitude,
                e.depth_km,
            )
        })
        .collect();

    info!("Extracted features for {} events", rows.len());
    rows
}

/// Ordered feature matrix; unknown columns are zero-filled with a warning
pub fn to_matrix(rows: &[FeatureRow], columns: &[&str]) -> Vec<Vec<f64>> {
    let unknown: BTreeSet<&str> = columns
        .iter()
        .copied()
        .filter(|c| !FEATURE_COLUMNS.contains(c))
        .collect();
    for column in &unknown {
        warn!("Missing column {}, setting to 0", column);
    }

    rows.iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| row.get(c).unwrap_or(0.0))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScorerConfig;
    use crate::projection::project;
    use crate::reference::ReferenceData;

    fn make_context() -> AssessmentContext {
        AssessmentContext::new(ReferenceData::builtin().unwrap(), ScorerConfig::default())
    }

    #[test]
    fn test_extract_on_boundary_point() {
        let context = make_context();
        let projections = project(&context.reference, 50.0);

        let row = extract(&context, &projections, &GeoPoint::new(28.0, 85.0), 7.8, 18.0);

        assert_eq!(row.plate_boundary_distance_km, Some(0.0));
        assert_eq!(row.plate_movement_rate, 5.0);
        assert_eq!(row.get("boundary_type_convergent"), Some(1.0));
        assert_eq!(row.get("boundary_type_transform"), Some(0.0));
        assert_eq!(row.get("magnitude"), Some(7.8));
        assert_eq!(row.get("depth"), Some(18.0));
    }

    #[test]
    fn test_dominant_plate_influence() {
        let context = make_context();
        let projections = project(&context.reference, 50.0);

        // At the Eurasian centre
        let dominant = dominant_plate(&projections, &GeoPoint::new(55.0, 100.0)).unwrap();
        assert_eq!(dominant.plate, "Eurasian");
        assert_eq!(dominant.distance_km, 0.0);
        assert!((dominant.influence() - dominant.speed_cm_yr / 1000.0).abs() < 1e-9);

        let far = DominantPlate {
            plate: "Far".to_string(),
            distance_km: 4000.0,
            speed_cm_yr: 500.0,
        };
        assert_eq!(far.influence(), 0.0);
    }

    #[test]
    fn test_matrix_fills_unknown_columns() {
        let context = make_context();
        let projections = project(&context.reference, 50.0);
        let rows = vec![extract(&context, &projections, &GeoPoint::new(0.0, 0.0), 5.0, 10.0)];

        let matrix = to_matrix(&rows, &["magnitude", "tidal_force", "depth"]);
        assert_eq!(matrix, vec![vec![5.0, 0.0, 10.0]]);

        let full = to_matrix(&rows, &FEATURE_COLUMNS);
        assert_eq!(full[0].len(), FEATURE_COLUMNS.len());
    }

    #[test]
    fn test_every_column_is_readable() {
        let context = make_context();
        let row = extract(&context, &[], &GeoPoint::new(10.0, 10.0), 4.0, 20.0);
        for column in FEATURE_COLUMNS {
            assert!(row.get(column).is_some(), "Column {} unreadable", column);
        }
        assert!(row.dominant_plate.is_none());
    }

    #[test]
    fn test_extract_catalogue() {
        let context = make_context();
        let projections = project(&context.reference, 50.0);
        let events = quake_feed::synthetic_catalogue(20, 42);

        let rows = extract_catalogue(&context, &projections, &events);
        assert_eq!(rows.len(), 20);
        assert_eq!(rows[3].latitude, events[3].latitude);
        assert_eq!(rows[3].magnitude, events[3].magnitude);
    }
}
