//! GeoJSON export of the reference tables and projected hotspots

use crate::projection::Hotspot;
use crate::reference::ReferenceData;
use crate::Result;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

fn point_feature(latitude: f64, longitude: f64, properties: serde_json::Value) -> Feature {
    let properties = match properties {
        serde_json::Value::Object(map) => Some(map),
        _ => None,
    };

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![longitude, latitude]))),
        id: None,
        properties,
        foreign_members: None,
    }
}

/// Boundary points, volcanoes and (optionally) hotspots as one collection
pub fn geological_map(data: &ReferenceData, hotspots: Option<&[Hotspot]>) -> FeatureCollection {
    let mut features: Vec<Feature> = data
        .boundary_points()
        .map(|(plate, b)| {
            point_feature(
                b.latitude,
                b.longitude,
                json!({
                    "layer": "boundary",
                    "plate": plate.name,
                    "boundary_type": b.boundary_type.as_str(),
                    "activity": b.activity,
                    "movement_rate_cm_yr": plate.movement_rate_cm_yr,
                }),
            )
        })
        .collect();

    features.extend(data.volcanoes.iter().map(|v| {
        point_feature(
            v.latitude,
            v.longitude,
            json!({
                "layer": "volcano",
                "name": v.name,
                "status": v.status,
                "vei": v.vei,
                "last_eruption_year": v.last_eruption_year,
                "elevation_m": v.elevation_m,
            }),
        )
    }));

    let hotspot_count = hotspots.map_or(0, |h| h.len());
    if let Some(hotspots) = hotspots {
        features.extend(hotspots.iter().map(|h| {
            point_feature(
                h.location.latitude,
                h.location.longitude,
                json!({
                    "layer": "hotspot",
                    "stress": h.stress,
                    "severity": h.severity.label(),
                }),
            )
        }));
    }

    let mut metadata = JsonObject::new();
    metadata.insert(
        "metadata".to_string(),
        json!({
            "boundary_points": data.boundary_point_count(),
            "volcanoes": data.volcanoes.len(),
            "hotspots": hotspot_count,
        }),
    );

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(metadata),
    }
}

/// Write a collection as pretty-printed GeoJSON
pub fn write_geojson(path: impl AsRef<Path>, collection: &FeatureCollection) -> Result<()> {
    let path = path.as_ref();
    info!("Writing GeoJSON to {:?}", path);

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, collection)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GeoPoint, RiskLevel};
    use tempfile::tempdir;

    fn layer_count(collection: &FeatureCollection, layer: &str) -> usize {
        collection
            .features
            .iter()
            .filter(|f| {
                f.properties
                    .as_ref()
                    .and_then(|p| p.get("layer"))
                    .and_then(|l| l.as_str())
                    == Some(layer)
            })
            .count()
    }

    #[test]
    fn test_geological_map_layers() {
        let data = ReferenceData::builtin().unwrap();
        let collection = geological_map(&data, None);

        assert_eq!(layer_count(&collection, "boundary"), 18);
        assert_eq!(layer_count(&collection, "volcano"), 77);
        assert_eq!(layer_count(&collection, "hotspot"), 0);
    }

    #[test]
    fn test_coordinates_are_lon_lat() {
        let data = ReferenceData::builtin().unwrap();
        let collection = geological_map(&data, None);

        let first = collection.features[0].geometry.as_ref().unwrap();
        assert_eq!(first.value, Value::Point(vec![-140.0, 60.0]));
    }

    #[test]
    fn test_hotspot_layer_and_write() {
        let data = ReferenceData::builtin().unwrap();
        let hotspots = vec![Hotspot {
            location: GeoPoint::new(10.0, 20.0),
            stress: 120.0,
            severity: RiskLevel::Extreme,
        }];
        let collection = geological_map(&data, Some(&hotspots));
        assert_eq!(layer_count(&collection, "hotspot"), 1);

        let dir = tempdir().unwrap();
        let path = dir.path().join("geological_map.geojson");
        write_geojson(&path, &collection).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: geojson::GeoJson = text.parse().unwrap();
        match parsed {
            geojson::GeoJson::FeatureCollection(fc) => {
                assert_eq!(fc.features.len(), 18 + 77 + 1);
            }
            other => panic!("Expected FeatureCollection, got {:?}", other),
        }
    }
}
