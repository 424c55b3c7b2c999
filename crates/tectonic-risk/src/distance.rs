//! Nearest-neighbour queries over the reference tables
//!
//! Linear scans in table order with strict `<`, so the first entry wins an
//! exact tie. Empty tables yield `None` rather than a zero distance.

use crate::reference::{BoundaryPoint, ReferenceData, VolcanoStatus};
use crate::GeoPoint;
use serde::{Deserialize, Serialize};

/// Nearest boundary point and the plate that owns it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestBoundary {
    pub plate: String,
    pub point: BoundaryPoint,
    pub movement_rate_cm_yr: f64,
    pub distance_km: f64,
}

impl NearestBoundary {
    /// `rate × type multiplier × activity × 1000 / max(d, 1)`
    pub fn stress_index(&self) -> f64 {
        self.movement_rate_cm_yr
            * self.point.boundary_type.stress_multiplier()
            * self.point.activity
            * (1000.000000000 / self.distance_km.max(1.000000000))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestVolcano {
    pub name: String,
    pub distance_km: f64,
}

/// Aggregated volcanic context for a point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolcanicInfluence {
    /// Sum of per-volcano influence within the radius
    pub index: f64,
    /// Nearest volcano regardless of radius
    pub nearest: Option<NearestVolcano>,
    /// Active volcanoes within the radius, regardless of recency
    pub active_nearby: usize,
}

impl VolcanicInfluence {
    pub fn nearest_distance_km(&self) -> Option<f64> {
        self.nearest.as_ref().map(|n| n.distance_km)
    }
}

/// Find the boundary point closest to `point`
pub fn nearest_boundary(data: &ReferenceData, point: &GeoPoint) -> Option<NearestBoundary> {
    let mut best: Option<NearestBoundary> = None;

    for (plate, boundary) in data.boundary_points() {
        let distance_km = point.distance_km(&boundary.location());
        let closer = best.as_ref().map_or(true, |b| distance_km < b.distance_km);
        if closer {
            best = Some(NearestBoundary {
                plate: plate.name.clone(),
                point: *boundary,
                movement_rate_cm_yr: plate.movement_rate_cm_yr,
                distance_km,
            });
        }
    }

    best
}

/// Volcanic influence index, nearest volcano and nearby active count
///
/// Within `radius_km` (strict), active volcanoes that erupted fewer than
/// `recent_years` before `reference_year` add `VEI/10 · (r - d)/r`, dormant
/// ones add `VEI/20 · (r - d)/r`. Extinct volcanoes never contribute.
pub fn volcanic_influence(
    data: &ReferenceData,
    point: &GeoPoint,
    radius_km: f64,
    reference_year: i32,
    recent_years: i64,
) -> VolcanicInfluence {
    let mut influence = VolcanicInfluence::default();

    for volcano in &data.volcanoes {
        let distance_km = point.distance_km(&volcano.location());

        let closer = influence
            .nearest
            .as_ref()
            .map_or(true, |n| distance_km < n.distance_km);
        if closer {
            influence.nearest = Some(NearestVolcano {
                name: volcano.name.clone(),
                distance_km,
            });
        }

        if distance_km >= radius_km {
            continue;
        }

        let falloff = (radius_km - distance_km) / radius_km;
        let vei = f64::from(volcano.vei);

        match volcano.status {
            VolcanoStatus::Active => {
                influence.active_nearby += 1;
                if volcano.years_since_eruption(reference_year) < recent_years {
                    influence.index += vei / 10.000000000 * falloff;
                }
            }
            VolcanoStatus::Dormant => {
                influence.index += vei / 20.000000000 * falloff;
            }
            VolcanoStatus::Extinct => {}
        }
    }

    influence
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{BoundaryType, Plate, Volcano};
    use crate::{haversine_km, DATASET_REFERENCE_YEAR};

    fn make_plate(name: &str, rate: f64, points: &[(f64, f64, BoundaryType, f64)]) -> Plate {
        Plate {
            name: name.to_string(),
            boundaries: points
                .iter()
                .map(|&(latitude, longitude, boundary_type, activity)| BoundaryPoint {
                    latitude,
                    longitude,
                    boundary_type,
                    activity,
                })
                .collect(),
            movement_rate_cm_yr: rate,
            direction: None,
            motion: None,
        }
    }

    fn make_volcano(name: &str, lat: f64, lon: f64, status: VolcanoStatus, year: i32, vei: u8) -> Volcano {
        Volcano {
            name: name.to_string(),
            latitude: lat,
            longitude: lon,
            elevation_m: 1000.0,
            status,
            last_eruption_year: year,
            vei,
        }
    }

    #[test]
    fn test_nearest_boundary_at_null_island() {
        let data = ReferenceData::builtin().unwrap();
        let origin = GeoPoint::new(0.0, 0.0);

        let nearest = nearest_boundary(&data, &origin).unwrap();

        let expected = data
            .boundary_points()
            .map(|(_, b)| haversine_km(0.0, 0.0, b.latitude, b.longitude))
            .fold(f64::INFINITY, f64::min);

        assert!(nearest.distance_km > 0.0, "Distance must not be a sentinel zero");
        assert_eq!(nearest.distance_km, expected);
        assert_eq!(nearest.plate, "Mid_Atlantic_Ridge");
    }

    #[test]
    fn test_first_entry_wins_tie() {
        let data = ReferenceData::new(
            vec![
                make_plate("East", 1.0, &[(0.0, 10.0, BoundaryType::Transform, 0.5)]),
                make_plate("West", 2.0, &[(0.0, -10.0, BoundaryType::Convergent, 0.5)]),
            ],
            vec![],
        );

        let nearest = nearest_boundary(&data, &GeoPoint::new(0.0, 0.0)).unwrap();
        assert_eq!(nearest.plate, "East");
    }

    #[test]
    fn test_empty_tables() {
        let data = ReferenceData::default();
        let point = GeoPoint::new(10.0, 10.0);

        assert!(nearest_boundary(&data, &point).is_none());

        let influence = volcanic_influence(&data, &point, 500.0, DATASET_REFERENCE_YEAR, 50);
        assert!(influence.nearest.is_none());
        assert_eq!(influence.index, 0.0);
        assert_eq!(influence.active_nearby, 0);
    }

    #[test]
    fn test_stress_index_clamps_distance() {
        let nearest = NearestBoundary {
            plate: "Test".to_string(),
            point: BoundaryPoint {
                latitude: 0.0,
                longitude: 0.0,
                boundary_type: BoundaryType::Convergent,
                activity: 1.0,
            },
            movement_rate_cm_yr: 5.0,
            distance_km: 0.0,
        };
        // 5 * 1.5 * 1.0 * 1000
        assert!((nearest.stress_index() - 7500.0).abs() < 1e-9);
    }

    #[test]
    fn test_kilauea_volcanic_context() {
        let data = ReferenceData::builtin().unwrap();
        let kilauea = GeoPoint::new(19.42, -155.29);

        let influence = volcanic_influence(&data, &kilauea, 500.0, DATASET_REFERENCE_YEAR, 50);
        let nearest = influence.nearest.as_ref().unwrap();

        assert_eq!(nearest.name, "Kilauea");
        assert!(nearest.distance_km < 1.0, "Nearest volcano at {} km", nearest.distance_km);
        assert!(influence.active_nearby >= 1);
        assert!(influence.index > 0.0);
    }

    #[test]
    fn test_influence_rules() {
        let data = ReferenceData::new(
            vec![],
            vec![
                // Recent active, VEI 4 at the query point: 0.4
                make_volcano("Recent", 0.0, 0.0, VolcanoStatus::Active, 2020, 4),
                // Active but quiet for 100 years: counted, no influence
                make_volcano("Quiet", 0.0, 0.0, VolcanoStatus::Active, 1924, 4),
                // Dormant VEI 4: 0.2
                make_volcano("Sleeping", 0.0, 0.0, VolcanoStatus::Dormant, 1000, 4),
                make_volcano("Dead", 0.0, 0.0, VolcanoStatus::Extinct, -5000, 8),
                // Active, far away
                make_volcano("Far", 45.0, 45.0, VolcanoStatus::Active, 2023, 5),
            ],
        );

        let influence = volcanic_influence(&data, &GeoPoint::new(0.0, 0.0), 500.0, 2024, 50);
        assert!((influence.index - 0.6).abs() < 1e-9, "Index {}", influence.index);
        assert_eq!(influence.active_nearby, 2);
        assert_eq!(influence.nearest.unwrap().name, "Recent");
    }

    #[test]
    fn test_influence_radius_is_strict() {
        let d = haversine_km(0.0, 0.0, 1.0, 0.0);
        let data = ReferenceData::new(
            vec![],
            vec![make_volcano("Edge", 1.0, 0.0, VolcanoStatus::Active, 2024, 5)],
        );

        let influence = volcanic_influence(&data, &GeoPoint::new(0.0, 0.0), d, 2024, 50);
        assert_eq!(influence.active_nearby, 0);
        assert_eq!(influence.index, 0.0);
        assert!(influence.nearest.is_some());
    }
}
