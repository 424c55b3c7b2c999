//! Reference data store: plate boundary points, moving plates, volcanoes
//!
//! The bundled dataset lives in `data/plates.json` and `data/volcanoes.json`
//! and goes through the same validating loader as user-supplied files.
//! Tables are read-only once built.

use crate::{loader, GeoPoint, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

const BUILTIN_PLATES: &str = include_str!("../data/plates.json");
const BUILTIN_VOLCANOES: &str = include_str!("../data/volcanoes.json");

/// Kind of plate boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryType {
    /// Plates colliding
    Convergent,
    /// Plates sliding past each other
    Transform,
    /// Plates separating
    Divergent,
    /// Anything the dataset labels otherwise
    Other,
}

impl BoundaryType {
    /// Parse a dataset label, falling back to `Other`
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "convergent" => BoundaryType::Convergent,
            "transform" => BoundaryType::Transform,
            "divergent" => BoundaryType::Divergent,
            _ => BoundaryType::Other,
        }
    }

    /// Stress multiplier applied to the boundary stress index
    pub fn stress_multiplier(&self) -> f64 {
        match self {
            BoundaryType::Convergent => 1.500000000,
            BoundaryType::Transform => 1.200000000,
            BoundaryType::Divergent => 0.800000000,
            BoundaryType::Other => 1.000000000,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BoundaryType::Convergent => "convergent",
            BoundaryType::Transform => "transform",
            BoundaryType::Divergent => "divergent",
            BoundaryType::Other => "other",
        }
    }
}

/// A sampled point on a plate boundary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryPoint {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "type")]
    pub boundary_type: BoundaryType,
    /// Activity level (0-1)
    pub activity: f64,
}

impl BoundaryPoint {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Plate velocity in degrees per year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlateVelocity {
    pub lat_deg_per_yr: f64,
    pub lon_deg_per_yr: f64,
}

/// Kinematic and physical attributes used by the projection module
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlateMotion {
    pub center: GeoPoint,
    pub velocity: PlateVelocity,
    pub area_km2: f64,
    pub thickness_km: f64,
    pub density_g_cm3: f64,
    pub age_myr: f64,
}

/// A named plate or boundary system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plate {
    pub name: String,
    /// Ordered boundary points; empty for plates used only in projection
    pub boundaries: Vec<BoundaryPoint>,
    /// Scalar movement rate in cm/year
    pub movement_rate_cm_yr: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motion: Option<PlateMotion>,
}

/// Volcano activity status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolcanoStatus {
    Active,
    Dormant,
    Extinct,
}

impl VolcanoStatus {
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "active" => Some(VolcanoStatus::Active),
            "dormant" => Some(VolcanoStatus::Dormant),
            "extinct" => Some(VolcanoStatus::Extinct),
            _ => None,
        }
    }
}

/// A catalogued volcano
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volcano {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation_m: f64,
    pub status: VolcanoStatus,
    /// Signed year of the last eruption, negative = BCE
    pub last_eruption_year: i32,
    /// Volcanic Explosivity Index (0-8)
    pub vei: u8,
}

impl Volcano {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    pub fn years_since_eruption(&self, reference_year: i32) -> i64 {
        i64::from(reference_year) - i64::from(self.last_eruption_year)
    }
}

/// Immutable reference tables shared by every scoring call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceData {
    pub plates: Vec<Plate>,
    pub volcanoes: Vec<Volcano>,
}

impl ReferenceData {
    pub fn new(plates: Vec<Plate>, volcanoes: Vec<Volcano>) -> Self {
        Self { plates, volcanoes }
    }

    /// Bundled plates and volcano catalogue
    pub fn builtin() -> Result<Self> {
        let plates = loader::parse_plates(BUILTIN_PLATES)?;
        let volcanoes = loader::parse_volcanoes(BUILTIN_VOLCANOES)?;

        let data = Self::new(plates, volcanoes);
        info!(
            "Loaded built-in reference data: {} plates, {} boundary points, {} volcanoes",
            data.plates.len(),
            data.boundary_point_count(),
            data.volcanoes.len()
        );
        Ok(data)
    }

    /// All boundary points with their owning plate, in table order
    pub fn boundary_points(&self) -> impl Iterator<Item = (&Plate, &BoundaryPoint)> + '_ {
        self.plates
            .iter()
            .flat_map(|plate| plate.boundaries.iter().map(move |b| (plate, b)))
    }

    /// Plates carrying motion data, in table order
    pub fn moving_plates(&self) -> impl Iterator<Item = (&Plate, &PlateMotion)> + '_ {
        self.plates
            .iter()
            .filter_map(|plate| plate.motion.as_ref().map(|m| (plate, m)))
    }

    pub fn boundary_point_count(&self) -> usize {
        self.plates.iter().map(|p| p.boundaries.len()).sum()
    }

    pub fn plate(&self, name: &str) -> Option<&Plate> {
        self.plates.iter().find(|p| p.name == name)
    }

    pub fn volcano(&self, name: &str) -> Option<&Volcano> {
        self.volcanoes.iter().find(|v| v.name == name)
    }
}
