//! Data loading from JSON files
//!
//! Rows with missing or out-of-range values are skipped and counted rather
//! than failing the whole file.

use crate::reference::{
    BoundaryPoint, BoundaryType, Plate, PlateMotion, PlateVelocity, ReferenceData, Volcano,
    VolcanoStatus,
};
use crate::{GeoPoint, Result, RiskError};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

/// Validate latitude is in valid range
fn is_valid_latitude(lat: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && lat.is_finite()
}

/// Validate longitude is in valid range
fn is_valid_longitude(lon: f64) -> bool {
    (-180.0..=180.0).contains(&lon) && lon.is_finite()
}

/// Sanitize name (letters incl. accented, digits, limited punctuation)
fn sanitize_name(name: String) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || " -_.,()&'".contains(*c))
        .take(256)
        .collect()
}

fn valid_location(lat: Option<f64>, lon: Option<f64>) -> Option<(f64, f64)> {
    match (lat, lon) {
        (Some(lat), Some(lon)) if is_valid_latitude(lat) && is_valid_longitude(lon) => {
            Some((lat, lon))
        }
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct RawPoint {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawBoundaryPoint {
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(rename = "type")]
    boundary_type: Option<String>,
    activity: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawVelocity {
    lat_deg_per_yr: Option<f64>,
    lon_deg_per_yr: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawMotion {
    center: Option<RawPoint>,
    velocity: Option<RawVelocity>,
    area_km2: Option<f64>,
    thickness_km: Option<f64>,
    density_g_cm3: Option<f64>,
    age_myr: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawPlate {
    name: Option<String>,
    boundaries: Option<Vec<RawBoundaryPoint>>,
    movement_rate_cm_yr: Option<f64>,
    direction: Option<String>,
    motion: Option<RawMotion>,
}

#[derive(Debug, Deserialize)]
struct RawVolcano {
    name: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    elevation_m: Option<f64>,
    status: Option<String>,
    last_eruption_year: Option<i32>,
    vei: Option<i64>,
}

/// Accept either `{"<key>": [...]}` or a bare array
fn rows_from_value<T: DeserializeOwned>(raw: serde_json::Value, key: &'static str) -> Result<Vec<T>> {
    if let Some(rows) = raw.get(key) {
        Ok(serde_json::from_value(rows.clone())?)
    } else if raw.is_array() {
        Ok(serde_json::from_value(raw)?)
    } else {
        Err(RiskError::EmptyReference(key))
    }
}

fn convert_boundary(raw: RawBoundaryPoint) -> Option<BoundaryPoint> {
    let (latitude, longitude) = valid_location(raw.latitude, raw.longitude)?;
    let activity = raw
        .activity
        .filter(|a| a.is_finite() && (0.0..=1.0).contains(a))?;

    Some(BoundaryPoint {
        latitude,
        longitude,
        boundary_type: raw
            .boundary_type
            .as_deref()
            .map(BoundaryType::parse)
            .unwrap_or(BoundaryType::Other),
        activity,
    })
}

fn convert_motion(raw: RawMotion) -> Option<PlateMotion> {
    let center = raw.center?;
    let (latitude, longitude) = valid_location(center.latitude, center.longitude)?;
    let velocity = raw.velocity?;

    Some(PlateMotion {
        center: GeoPoint::new(latitude, longitude),
        velocity: PlateVelocity {
            lat_deg_per_yr: velocity.lat_deg_per_yr.unwrap_or(0.0),
            lon_deg_per_yr: velocity.lon_deg_per_yr.unwrap_or(0.0),
        },
        area_km2: raw.area_km2.unwrap_or(0.0),
        thickness_km: raw.thickness_km.unwrap_or(0.0),
        density_g_cm3: raw.density_g_cm3.unwrap_or(0.0),
        age_myr: raw.age_myr.unwrap_or(0.0),
    })
}

fn convert_plates(raw: Vec<RawPlate>) -> Vec<Plate> {
    let mut plates = Vec::with_capacity(raw.len());
    let mut skipped_points = 0;

    for (i, plate) in raw.into_iter().enumerate() {
        let name = sanitize_name(plate.name.unwrap_or_else(|| format!("plate-{}", i)));

        let mut boundaries = Vec::new();
        for point in plate.boundaries.unwrap_or_default() {
            match convert_boundary(point) {
                Some(b) => boundaries.push(b),
                None => skipped_points += 1,
            }
        }

        let motion = match plate.motion {
            Some(raw_motion) => {
                let motion = convert_motion(raw_motion);
                if motion.is_none() {
                    warn!("Plate {} has unusable motion data, excluded from projection", name);
                }
                motion
            }
            None => None,
        };

        plates.push(Plate {
            name,
            boundaries,
            movement_rate_cm_yr: plate
                .movement_rate_cm_yr
                .filter(|r| r.is_finite())
                .unwrap_or(0.0),
            direction: plate.direction,
            motion,
        });
    }

    if skipped_points > 0 {
        warn!("Skipped {} boundary points with invalid coordinates or activity", skipped_points);
    }

    plates
}

fn convert_volcanoes(raw: Vec<RawVolcano>) -> Vec<Volcano> {
    let mut volcanoes = Vec::with_capacity(raw.len());
    let mut skipped = 0;

    for (i, volcano) in raw.into_iter().enumerate() {
        let Some((latitude, longitude)) = valid_location(volcano.latitude, volcano.longitude) else {
            skipped += 1;
            continue;
        };
        let Some(status) = volcano.status.as_deref().and_then(VolcanoStatus::parse) else {
            skipped += 1;
            continue;
        };
        let Some(vei) = volcano
            .vei
            .filter(|v| (0..=8).contains(v))
            .and_then(|v| u8::try_from(v).ok())
        else {
            skipped += 1;
            continue;
        };
        let Some(last_eruption_year) = volcano.last_eruption_year else {
            skipped += 1;
            continue;
        };

        volcanoes.push(Volcano {
            name: sanitize_name(volcano.name.unwrap_or_else(|| format!("volcano-{}", i))),
            latitude,
            longitude,
            elevation_m: volcano.elevation_m.unwrap_or(0.0),
            status,
            last_eruption_year,
            vei,
        });
    }

    if skipped > 0 {
        warn!("Skipped {} volcano rows with missing or invalid fields", skipped);
    }

    volcanoes
}

/// Parse plates from a JSON document
pub fn parse_plates(json: &str) -> Result<Vec<Plate>> {
    let raw: serde_json::Value = serde_json::from_str(json)?;
    Ok(convert_plates(rows_from_value(raw, "plates")?))
}

/// Parse volcanoes from a JSON document
pub fn parse_volcanoes(json: &str) -> Result<Vec<Volcano>> {
    let raw: serde_json::Value = serde_json::from_str(json)?;
    Ok(convert_volcanoes(rows_from_value(raw, "volcanoes")?))
}

fn read_value(path: &Path) -> Result<serde_json::Value> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

/// Load plates from JSON file
pub fn load_plates(path: impl AsRef<Path>) -> Result<Vec<Plate>> {
    let path = path.as_ref();
    info!("Loading plates from {:?}", path);

    let plates = convert_plates(rows_from_value(read_value(path)?, "plates")?);
    info!("Loaded {} plates", plates.len());

    Ok(plates)
}

/// Load volcanoes from JSON file
pub fn load_volcanoes(path: impl AsRef<Path>) -> Result<Vec<Volcano>> {
    let path = path.as_ref();
    info!("Loading volcanoes from {:?}", path);

    let volcanoes = convert_volcanoes(rows_from_value(read_value(path)?, "volcanoes")?);
    info!("Loaded {} volcanoes", volcanoes.len());

    Ok(volcanoes)
}

/// Load a combined `{"plates": [...], "volcanoes": [...]}` reference file
pub fn load_reference_data(path: impl AsRef<Path>) -> Result<ReferenceData> {
    let path = path.as_ref();
    info!("Loading reference data from {:?}", path);

    let raw = read_value(path)?;
    let plates = convert_plates(rows_from_value(raw.clone(), "plates")?);
    if plates.is_empty() {
        return Err(RiskError::EmptyReference("plates"));
    }
    let volcanoes = match raw.get("volcanoes") {
        Some(_) => convert_volcanoes(rows_from_value(raw, "volcanoes")?),
        None => Vec::new(),
    };

    let data = ReferenceData::new(plates, volcanoes);
    info!(
        "Loaded {} plates ({} boundary points) and {} volcanoes",
        data.plates.len(),
        data.boundary_point_count(),
        data.volcanoes.len()
    );

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_plates_skips_invalid_points() {
        let json = r#"{
            "plates": [
                {"name": "Test", "movement_rate_cm_yr": 2.0, "boundaries": [
                    {"latitude": 10.0, "longitude": 20.0, "type": "convergent", "activity": 0.5},
                    {"latitude": 95.0, "longitude": 20.0, "type": "convergent", "activity": 0.5},
                    {"latitude": 10.0, "longitude": 20.0, "type": "transform", "activity": 1.5},
                    {"longitude": 20.0, "type": "transform", "activity": 0.5}
                ]}
            ]
        }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let plates = load_plates(file.path()).unwrap();
        assert_eq!(plates.len(), 1);
        assert_eq!(plates[0].boundaries.len(), 1);
        assert_eq!(plates[0].boundaries[0].boundary_type, BoundaryType::Convergent);
    }

    #[test]
    fn test_unknown_boundary_type_becomes_other() {
        let json = r#"[{"name": "Hotspot", "boundaries": [
            {"latitude": 0.0, "longitude": 0.0, "type": "hotspot", "activity": 0.3}
        ]}]"#;

        let plates = parse_plates(json).unwrap();
        assert_eq!(plates[0].boundaries[0].boundary_type, BoundaryType::Other);
        assert_eq!(plates[0].movement_rate_cm_yr, 0.0);
    }

    #[test]
    fn test_load_volcanoes() {
        let json = r#"{
            "volcanoes": [
                {"name": "Etna", "latitude": 37.75, "longitude": 14.99, "elevation_m": 3329, "status": "active", "last_eruption_year": 2024, "vei": 3},
                {"name": "Bad VEI", "latitude": 0.0, "longitude": 0.0, "status": "active", "last_eruption_year": 2000, "vei": 9},
                {"name": "Bad Status", "latitude": 0.0, "longitude": 0.0, "status": "smoking", "last_eruption_year": 2000, "vei": 2},
                {"name": "No Coords", "status": "dormant", "last_eruption_year": 2000, "vei": 2}
            ]
        }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let volcanoes = load_volcanoes(file.path()).unwrap();
        assert_eq!(volcanoes.len(), 1);
        assert_eq!(volcanoes[0].name, "Etna");
        assert_eq!(volcanoes[0].status, VolcanoStatus::Active);
    }

    #[test]
    fn test_motion_without_center_is_dropped() {
        let json = r#"[{"name": "Drifting", "motion": {"velocity": {"lat_deg_per_yr": 0.1}}}]"#;
        let plates = parse_plates(json).unwrap();
        assert!(plates[0].motion.is_none());
    }

    #[test]
    fn test_load_reference_data() {
        let json = r#"{
            "plates": [
                {"name": "Ridge", "movement_rate_cm_yr": 2.5, "boundaries": [
                    {"latitude": 0.0, "longitude": -25.0, "type": "divergent", "activity": 0.8}
                ]},
                {"name": "Mover", "motion": {
                    "center": {"latitude": 10.0, "longitude": 10.0},
                    "velocity": {"lat_deg_per_yr": 0.01, "lon_deg_per_yr": 0.02},
                    "thickness_km": 40.0, "density_g_cm3": 2.7
                }}
            ],
            "volcanoes": [
                {"name": "Hekla", "latitude": 63.98, "longitude": -19.70, "status": "active", "last_eruption_year": 2000, "vei": 3}
            ]
        }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let data = load_reference_data(file.path()).unwrap();
        assert_eq!(data.plates.len(), 2);
        assert_eq!(data.boundary_point_count(), 1);
        assert_eq!(data.moving_plates().count(), 1);
        assert_eq!(data.volcanoes.len(), 1);
    }

    #[test]
    fn test_reference_without_plates_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"plates": []}"#).unwrap();

        let err = load_reference_data(file.path()).unwrap_err();
        assert!(matches!(err, RiskError::EmptyReference("plates")));
    }

    #[test]
    fn test_sanitize_name_keeps_accents() {
        assert_eq!(sanitize_name("Popocatépetl<script>".to_string()), "Popocatépetlscript");
    }
}
