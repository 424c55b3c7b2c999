//! Plain-text reports
//!
//! Each report is a `Display` wrapper so callers can print it, log it or
//! write it to a file.

use crate::estimate::LocationEstimate;
use crate::projection::ProjectionContext;
use crate::scorer::RiskAssessment;
use quake_feed::SeismicEvent;
use std::cmp::Ordering;
use std::fmt;

const WIDE: usize = 80;
const NARROW: usize = 50;

fn heading(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{}", title)?;
    writeln!(f, "{}", "-".repeat(NARROW))
}

fn banner(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "{}", "=".repeat(WIDE))?;
    writeln!(f, "{}", title)?;
    writeln!(f, "{}", "=".repeat(WIDE))
}

fn km(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |d| format!("{:.1} km", d))
}

/// Full breakdown of one assessment
pub struct AssessmentReport<'a>(pub &'a RiskAssessment);

impl fmt::Display for AssessmentReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = self.0;

        banner(f, &format!("EARTHQUAKE RISK ASSESSMENT ({})", a.variant.to_string().to_uppercase()))?;
        writeln!(f, "Location: {}", a.location)?;
        writeln!(f, "Magnitude: {:.1}  Depth: {:.1} km", a.magnitude, a.depth_km)?;

        heading(f, "GEOLOGICAL & TECTONIC ANALYSIS")?;
        match &a.geology.nearest_boundary {
            Some(b) => {
                writeln!(f, "Nearest Plate Boundary: {}", b.plate)?;
                writeln!(f, "Boundary Type: {}", b.point.boundary_type.as_str())?;
                writeln!(f, "Distance to Boundary: {:.1} km", b.distance_km)?;
                writeln!(f, "Plate Movement Rate: {:.1} cm/year", b.movement_rate_cm_yr)?;
                writeln!(f, "Plate Activity Level: {:.2}", b.point.activity)?;
            }
            None => writeln!(f, "No plate boundaries in reference data")?,
        }
        writeln!(f, "Tectonic Stress Index: {:.2}", a.geology.stress_index)?;

        heading(f, "VOLCANIC RISK ANALYSIS")?;
        let volcanic = &a.geology.volcanic;
        writeln!(f, "Volcanic Risk Index: {:.2}", volcanic.index)?;
        match &volcanic.nearest {
            Some(v) => writeln!(f, "Nearest Volcano: {} ({:.1} km)", v.name, v.distance_km)?,
            None => writeln!(f, "Nearest Volcano: n/a")?,
        }
        writeln!(f, "Active Volcanoes Nearby (500km): {}", volcanic.active_nearby)?;

        if let Some(p) = &a.projection {
            heading(f, &format!("PLATE MOVEMENT PREDICTIONS ({} years)", p.years))?;
            match (&p.nearest_collision, p.collision_distance_km) {
                (Some(zone), Some(d)) => {
                    writeln!(f, "Nearest Collision Zone: {} <-> {}", zone.plate_a, zone.plate_b)?;
                    writeln!(f, "Distance to Collision Zone: {:.1} km", d)?;
                    writeln!(f, "Collision Probability: {:.3}", zone.probability)?;
                    writeln!(f, "Approach Rate: {:.1} km/{} years", zone.approach_km, p.years)?;
                }
                _ => writeln!(f, "No significant collision zones detected nearby")?,
            }
            writeln!(f, "Local Stress Level: {:.1}", p.local_stress)?;
            writeln!(f, "Distance to Nearest Hotspot: {}", km(p.nearest_hotspot_km))?;
        }

        heading(f, "RISK FACTOR BREAKDOWN")?;
        for factor in &a.factors {
            writeln!(
                f,
                "  {:<26} {:.3} (weight: {:.2}, contribution: {:.3})",
                factor.kind.label(),
                factor.value,
                factor.weight,
                factor.contribution()
            )?;
        }

        heading(f, "FINAL RISK ASSESSMENT")?;
        writeln!(f, "Overall Risk Score: {:.3}", a.overall_risk)?;
        writeln!(f, "Risk Level: {}", a.risk_level)?;
        writeln!(f, "Recommendation: {}", a.recommendation)?;

        if let Some(c) = &a.confidence {
            heading(f, "CONFIDENCE ASSESSMENT")?;
            for q in &c.factors {
                writeln!(f, "  {}: {:.2}", q.name, q.score)?;
            }
            writeln!(f, "Overall Confidence: {:.2} ({})", c.score, c.level)?;
        }

        Ok(())
    }
}

/// Named assessments ranked by overall risk
pub struct SummaryTable<'a>(pub &'a [(String, RiskAssessment)]);

impl fmt::Display for SummaryTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rows: Vec<&(String, RiskAssessment)> = self.0.iter().collect();
        rows.sort_by(|a, b| {
            b.1.overall_risk
                .partial_cmp(&a.1.overall_risk)
                .unwrap_or(Ordering::Equal)
        });

        banner(f, "RISK SUMMARY")?;
        writeln!(f, "{:<40} {:>8}  {}", "Location", "Score", "Level")?;
        for (name, a) in rows {
            writeln!(f, "{:<40} {:>8.3}  {}", name, a.overall_risk, a.risk_level)?;
        }
        Ok(())
    }
}

/// Plate movement, collision and hotspot report
pub struct ProjectionReport<'a> {
    pub context: &'a ProjectionContext,
    /// Hotspots to list
    pub top: usize,
}

impl fmt::Display for ProjectionReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.context;

        banner(f, "TECTONIC PLATE MOVEMENT ANALYSIS REPORT")?;
        writeln!(f, "Analysis Period: {} years ahead", c.years)?;

        heading(f, "PLATE MOVEMENT PREDICTIONS")?;
        for p in &c.projections {
            writeln!(f)?;
            writeln!(f, "{} Plate:", p.plate)?;
            writeln!(f, "  Current Position: {}", p.current_center)?;
            writeln!(f, "  Future Position: {}", p.future_center)?;
            writeln!(f, "  Movement Distance: {:.1} km", p.movement_distance_km)?;
            writeln!(f, "  Movement Rate: {:.1} cm/year", p.speed_cm_yr)?;
            writeln!(f, "  Direction: {:.1}°", p.direction_deg)?;
        }

        heading(f, "COLLISION ZONE ANALYSIS")?;
        if c.collision_zones.is_empty() {
            writeln!(f, "No significant collision zones detected in the analysis period.")?;
        }
        for (i, zone) in c.collision_zones.iter().take(5).enumerate() {
            writeln!(f)?;
            writeln!(f, "{}. {} <-> {}", i + 1, zone.plate_a, zone.plate_b)?;
            writeln!(f, "   Collision Probability: {:.3}", zone.probability)?;
            writeln!(f, "   Approach Rate: {:.1} km/{} years", zone.approach_km, c.years)?;
            writeln!(f, "   Estimated Zone: {}", zone.zone)?;
        }

        heading(f, "SEISMIC HOTSPOT PREDICTIONS")?;
        for (i, h) in c.hotspots.iter().take(self.top).enumerate() {
            writeln!(
                f,
                "{:2}. {:6.2}°N, {:7.2}°E - Stress: {:6.1} - Risk: {}",
                i + 1,
                h.location.latitude,
                h.location.longitude,
                h.stress,
                h.severity
            )?;
        }

        heading(f, "SUMMARY")?;
        writeln!(f, "Total Plates Analyzed: {}", c.projections.len())?;
        writeln!(f, "Collision Zones Identified: {}", c.collision_zones.len())?;
        writeln!(f, "High-Risk Seismic Hotspots: {}", c.hotspots.len())?;
        writeln!(f, "Grid Cells Evaluated: {}", c.grid_cells)
    }
}

pub struct EstimateReport<'a>(pub &'a LocationEstimate);

impl fmt::Display for EstimateReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = self.0;
        writeln!(f, "Location: {}", e.location)?;
        writeln!(f, "Nearest Plate: {}", e.plate.as_deref().unwrap_or("n/a"))?;
        writeln!(
            f,
            "Boundary Type: {}",
            e.boundary_type.map_or("n/a", |t| t.as_str())
        )?;
        writeln!(f, "Distance to Boundary: {}", km(e.boundary_distance_km))?;
        writeln!(f, "Active Volcanoes Nearby: {}", e.active_volcanoes_nearby)?;
        writeln!(f, "Estimated Magnitude: {:.1}", e.magnitude)?;
        writeln!(f, "Estimated Depth: {:.1} km", e.depth_km)
    }
}

/// Catalogue events ranked by risk
pub struct EventRanking<'a> {
    pub rows: &'a [(SeismicEvent, RiskAssessment)],
    pub top: usize,
}

impl fmt::Display for EventRanking<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rows: Vec<&(SeismicEvent, RiskAssessment)> = self.rows.iter().collect();
        rows.sort_by(|a, b| {
            b.1.overall_risk
                .partial_cmp(&a.1.overall_risk)
                .unwrap_or(Ordering::Equal)
        });

        writeln!(
            f,
            "{:>4} {:>5} {:>7} {:>9} {:>10} {:>7}  {}",
            "#", "Mag", "Depth", "Lat", "Lon", "Score", "Level"
        )?;
        for (i, (event, a)) in rows.iter().take(self.top).enumerate() {
            write!(
                f,
                "{:>4} {:>5.1} {:>7.1} {:>9.3} {:>10.3} {:>7.3}  {}",
                i + 1,
                event.magnitude,
                event.depth_km,
                event.latitude,
                event.longitude,
                a.overall_risk,
                a.risk_level
            )?;
            match &event.place {
                Some(place) => writeln!(f, "  {}", place)?,
                None => writeln!(f)?,
            }
        }
        Ok(())
    }
}
