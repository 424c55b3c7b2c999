//! Plate movement projection
//!
//! Linear extrapolation of plate centres over a horizon, pairwise collision
//! detection between the projected centres, and a global stress grid.
//!
//! | Quantity           | Formula |
//! |--------------------|---------|
//! | Future centre      | `centre + velocity · years` |
//! | Movement distance  | `sqrt((v_lat·y·111)² + (v_lon·y·111·cos φ)²)` km |
//! | Speed              | per-year movement distance × 100000 cm/yr |
//! | Collision prob.    | `max(0, (current - future) / current)` |
//! | Cell stress        | `Σ speed · thickness · density / (1 + d/1000)` for d < 3000 km |

use crate::config::ProjectionConfig;
use crate::reference::ReferenceData;
use crate::{GeoPoint, Result, RiskError, RiskLevel};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, info};

/// km per degree used for movement distances
const KM_PER_DEGREE: f64 = 111.000000000;

const CM_PER_KM: f64 = 100000.000000000;

/// Plates further than this from a cell add no stress
pub const STRESS_RADIUS_KM: f64 = 3000.000000000;

/// Hotspots closer than this contribute to local stress
pub const LOCAL_STRESS_RADIUS_KM: f64 = 100.000000000;

/// Finest accepted grid step; 0.1° is about 6.5 million cells
pub const MIN_RESOLUTION_DEG: f64 = 0.100000000;

/// Reject grid steps that are not finite or finer than `MIN_RESOLUTION_DEG`
pub fn check_resolution(resolution_deg: f64) -> Result<()> {
    if resolution_deg.is_finite() && resolution_deg >= MIN_RESOLUTION_DEG {
        Ok(())
    } else {
        Err(RiskError::InvalidResolution(resolution_deg))
    }
}

/// Projected motion of one plate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlateProjection {
    pub plate: String,
    pub current_center: GeoPoint,
    pub future_center: GeoPoint,
    pub movement_distance_km: f64,
    pub speed_cm_yr: f64,
    /// `atan2(v_lat, v_lon)` in degrees
    pub direction_deg: f64,
    pub thickness_km: f64,
    pub density_g_cm3: f64,
}

/// A pair of plates whose centres get closer over the horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionZone {
    pub plate_a: String,
    pub plate_b: String,
    pub current_distance_km: f64,
    pub future_distance_km: f64,
    /// Reduction in centre separation over the horizon (km)
    pub approach_km: f64,
    pub probability: f64,
    /// Midpoint of the two future centres
    pub zone: GeoPoint,
}

/// A grid cell above the hotspot threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub location: GeoPoint,
    pub stress: f64,
    pub severity: RiskLevel,
}

/// Project every plate that carries motion data
pub fn project(data: &ReferenceData, years: f64) -> Vec<PlateProjection> {
    data.moving_plates()
        .map(|(plate, motion)| {
            let v = motion.velocity;
            let center = motion.center;
            let cos_lat = center.latitude.to_radians().cos();

            let future_center = GeoPoint::new(
                center.latitude + v.lat_deg_per_yr * years,
                center.longitude + v.lon_deg_per_yr * years,
            );

            let per_year_km = ((v.lat_deg_per_yr * KM_PER_DEGREE).powi(2)
                + (v.lon_deg_per_yr * KM_PER_DEGREE * cos_lat).powi(2))
            .sqrt();

            let projection = PlateProjection {
                plate: plate.name.clone(),
                current_center: center,
                future_center,
                movement_distance_km: per_year_km * years.abs(),
                speed_cm_yr: per_year_km * CM_PER_KM,
                direction_deg: v.lat_deg_per_yr.atan2(v.lon_deg_per_yr).to_degrees(),
                thickness_km: motion.thickness_km,
                density_g_cm3: motion.density_g_cm3,
            };

            debug!(
                "{}: {:.1} km over {} years ({:.1} cm/yr, {:.1}°)",
                projection.plate,
                projection.movement_distance_km,
                years,
                projection.speed_cm_yr,
                projection.direction_deg
            );

            projection
        })
        .collect()
}

/// Pairs of plates that approach each other, most probable first
pub fn detect_collision_zones(projections: &[PlateProjection]) -> Vec<CollisionZone> {
    let mut zones = Vec::new();

    for (i, a) in projections.iter().enumerate() {
        for b in &projections[i + 1..] {
            let current = a.current_center.distance_km(&b.current_center);
            let future = a.future_center.distance_km(&b.future_center);

            if future >= current {
                continue;
            }

            let probability = if current > 0.0 {
                ((current - future) / current).max(0.0)
            } else {
                0.0
            };

            zones.push(CollisionZone {
                plate_a: a.plate.clone(),
                plate_b: b.plate.clone(),
                current_distance_km: current,
                future_distance_km: future,
                approach_km: current - future,
                probability,
                zone: GeoPoint::new(
                    (a.future_center.latitude + b.future_center.latitude) / 2.000000000,
                    (a.future_center.longitude + b.future_center.longitude) / 2.000000000,
                ),
            });
        }
    }

    // Stable, so equal probabilities keep pair order
    zones.sort_by(|x, y| {
        y.probability
            .partial_cmp(&x.probability)
            .unwrap_or(Ordering::Equal)
    });
    zones
}

/// Evenly spaced axis values from `start` while below `limit`
fn axis(start: f64, limit: f64, step: f64) -> Vec<f64> {
    let mut values = Vec::new();
    let mut i = 0u32;
    loop {
        let v = start + f64::from(i) * step;
        if v >= limit {
            break;
        }
        values.push(v);
        i += 1;
    }
    values
}

/// Accumulated stress on a regular lat/lon grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressGrid {
    pub resolution_deg: f64,
    pub latitudes: Vec<f64>,
    pub longitudes: Vec<f64>,
    /// Row-major by longitude: `stress[lon_index][lat_index]`
    pub stress: Vec<Vec<f64>>,
}

impl StressGrid {
    /// Build the grid from plate projections
    ///
    /// Latitudes run from -90 and longitudes from -180 in `resolution_deg`
    /// steps up to and including 90 and 180 when the step divides evenly.
    pub fn compute(projections: &[PlateProjection], resolution_deg: f64) -> Result<Self> {
        check_resolution(resolution_deg)?;

        let latitudes = axis(-90.000000000, 91.000000000, resolution_deg);
        let longitudes = axis(-180.000000000, 181.000000000, resolution_deg);

        let stress: Vec<Vec<f64>> = longitudes
            .iter()
            .map(|&lon| {
                latitudes
                    .iter()
                    .map(|&lat| cell_stress(projections, &GeoPoint::new(lat, lon)))
                    .collect()
            })
            .collect();

        info!(
            "Computed stress grid: {} x {} cells at {}°",
            latitudes.len(),
            longitudes.len(),
            resolution_deg
        );

        Ok(Self {
            resolution_deg,
            latitudes,
            longitudes,
            stress,
        })
    }

    pub fn cell_count(&self) -> usize {
        self.latitudes.len() * self.longitudes.len()
    }

    pub fn max_stress(&self) -> f64 {
        self.stress
            .iter()
            .flatten()
            .copied()
            .fold(0.0, f64::max)
    }

    /// Cells with stress strictly above `threshold`, highest first
    pub fn hotspots(&self, threshold: f64) -> Vec<Hotspot> {
        let mut hotspots: Vec<Hotspot> = self
            .longitudes
            .iter()
            .zip(&self.stress)
            .flat_map(|(&lon, column)| {
                self.latitudes
                    .iter()
                    .zip(column)
                    .filter(|(_, stress)| **stress > threshold)
                    .map(move |(&lat, &stress)| Hotspot {
                        location: GeoPoint::new(lat, lon),
                        stress,
                        severity: RiskLevel::from_stress(stress),
                    })
            })
            .collect();

        hotspots.sort_by(|a, b| b.stress.partial_cmp(&a.stress).unwrap_or(Ordering::Equal));
        hotspots
    }
}

fn cell_stress(projections: &[PlateProjection], cell: &GeoPoint) -> f64 {
    projections
        .iter()
        .filter_map(|p| {
            let d = cell.distance_km(&p.current_center);
            (d < STRESS_RADIUS_KM).then(|| {
                p.speed_cm_yr * p.thickness_km * p.density_g_cm3 / (1.000000000 + d / 1000.000000000)
            })
        })
        .sum()
}

/// Projection results for one horizon, queried per point by the scorer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionContext {
    pub years: f64,
    pub projections: Vec<PlateProjection>,
    pub collision_zones: Vec<CollisionZone>,
    pub hotspots: Vec<Hotspot>,
    pub grid_cells: usize,
}

impl ProjectionContext {
    pub fn build(data: &ReferenceData, config: &ProjectionConfig) -> Result<Self> {
        config.validate()?;

        let projections = project(data, config.years);
        let collision_zones = detect_collision_zones(&projections);
        let grid = StressGrid::compute(&projections, config.resolution_deg)?;
        let hotspots = grid.hotspots(config.hotspot_threshold);

        info!(
            "Projection over {} years: {} plates, {} collision zones, {} hotspots",
            config.years,
            projections.len(),
            collision_zones.len(),
            hotspots.len()
        );

        Ok(Self {
            years: config.years,
            projections,
            collision_zones,
            hotspots,
            grid_cells: grid.cell_count(),
        })
    }

    /// Nearest collision zone and its distance; first zone wins ties
    pub fn nearest_collision_zone(&self, point: &GeoPoint) -> Option<(&CollisionZone, f64)> {
        let mut best: Option<(&CollisionZone, f64)> = None;
        for zone in &self.collision_zones {
            let d = point.distance_km(&zone.zone);
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((zone, d));
            }
        }
        best
    }

    /// Maximum of `stress · (100 - d)/100` over hotspots within 100 km
    pub fn local_stress(&self, point: &GeoPoint) -> f64 {
        self.hotspots
            .iter()
            .filter_map(|h| {
                let d = point.distance_km(&h.location);
                (d < LOCAL_STRESS_RADIUS_KM)
                    .then(|| h.stress * (LOCAL_STRESS_RADIUS_KM - d) / LOCAL_STRESS_RADIUS_KM)
            })
            .fold(0.0, f64::max)
    }

    pub fn nearest_hotspot_km(&self, point: &GeoPoint) -> Option<f64> {
        self.hotspots
            .iter()
            .map(|h| point.distance_km(&h.location))
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
    }
}
