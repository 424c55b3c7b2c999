//! Earthquake Risk Assessment CLI
//!
//! Scores geographic points against plate boundaries, the volcano catalogue
//! and projected plate motion.
//!
//! Usage:
//!   assess-risk assess --lat 35.6762 --lon 139.6503 --variant integrated
//!   assess-risk samples
//!   assess-risk plates --years 100 --resolution 2 --top 10
//!   assess-risk feed --days 7 --min-magnitude 4.5
//!   assess-risk export-map --hotspots

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand};
use dialoguer::Input;
use quake_feed::{FeedConfig, QuakeFeed};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tectonic_risk::estimate::{self, LocationEstimate};
use tectonic_risk::features::{self, FEATURE_COLUMNS};
use tectonic_risk::report::{
    AssessmentReport, EstimateReport, EventRanking, ProjectionReport, SummaryTable,
};
use tectonic_risk::scorer::SAMPLE_LOCATIONS;
use tectonic_risk::{
    export, loader, projection, AssessmentContext, GeoPoint, ProjectionContext,
    QueryPoint, ReferenceData, RiskAssessment, ScoringVariant, Settings,
};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Projection horizon used for plate influence features
const FEATURE_PROJECTION_YEARS: f64 = 50.000000000;

#[derive(Parser, Debug)]
#[command(
    name = "assess-risk",
    about = "Heuristic earthquake risk scoring from plate boundaries, volcanoes and plate motion"
)]
struct Args {
    /// Alternative reference dataset (JSON with "plates" and "volcanoes")
    #[arg(long, global = true)]
    reference: Option<PathBuf>,

    /// Settings file (JSON); missing fields keep their defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assess one location, prompting for anything not given
    Assess {
        #[arg(long, allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, allow_negative_numbers = true)]
        lon: Option<f64>,

        #[arg(long)]
        magnitude: Option<f64>,

        /// Depth in km
        #[arg(long)]
        depth: Option<f64>,

        /// basic or integrated
        #[arg(long, default_value = "integrated")]
        variant: ScoringVariant,

        /// Use estimated magnitude/depth instead of prompting
        #[arg(long)]
        auto: bool,

        /// Write the assessment as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Assess the built-in high-risk sample locations
    Samples {
        #[arg(long, default_value = "integrated")]
        variant: ScoringVariant,
    },

    /// Plate movement projection report
    Plates {
        #[arg(long)]
        years: Option<f64>,

        /// Stress grid resolution in degrees (at least 0.1)
        #[arg(long)]
        resolution: Option<f64>,

        /// Hotspot stress threshold
        #[arg(long)]
        threshold: Option<f64>,

        /// Hotspots to list
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Write the projection as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Estimate plausible magnitude and depth for a location
    Estimate {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },

    /// Fetch recent earthquakes (or a synthetic catalogue) and rank them
    Feed {
        #[arg(long)]
        days: Option<i64>,

        #[arg(long)]
        min_magnitude: Option<f64>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        #[arg(long, default_value_t = 20)]
        top: usize,
    },

    /// Geological feature rows for a synthetic catalogue
    Features {
        #[arg(long, default_value_t = 1000)]
        samples: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Comma-separated column list (default: all)
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,

        #[arg(short, long, default_value = "features.json")]
        output: PathBuf,
    },

    /// Export boundaries, volcanoes and hotspots as GeoJSON
    ExportMap {
        #[arg(short, long, default_value = "geological_map.geojson")]
        output: PathBuf,

        /// Include projected stress hotspots
        #[arg(long)]
        hotspots: bool,
    },
}

#[derive(Serialize)]
struct AssessmentOutput<'a> {
    generated_at: DateTime<Utc>,
    assessment: &'a RiskAssessment,
}

#[derive(Serialize)]
struct FeatureOutput<'a> {
    generated_at: DateTime<Utc>,
    seed: u64,
    columns: &'a [&'a str],
    rows: Vec<Vec<f64>>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    info!("Writing output to {:?}", path);
    let file = File::create(path).with_context(|| format!("creating {:?}", path))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

fn load_reference(path: Option<&Path>) -> Result<ReferenceData> {
    let data = match path {
        Some(path) => loader::load_reference_data(path)?,
        None => ReferenceData::builtin()?,
    };
    Ok(data)
}

/// Re-prompts until the input parses as a number; range is not enforced
fn prompt_coordinate(prompt: &str) -> Result<f64> {
    let value = Input::<f64>::new().with_prompt(prompt).interact_text()?;
    Ok(value)
}

fn prompt_with_default(prompt: &str, default: f64) -> Result<f64> {
    let value = Input::<f64>::new()
        .with_prompt(prompt)
        .default((default * 10.0).round() / 10.0)
        .interact_text()?;
    Ok(value)
}

/// Attach a projection when the integrated variant needs one
fn scoring_context(
    reference: ReferenceData,
    settings: &Settings,
    variant: ScoringVariant,
) -> Result<AssessmentContext> {
    let context = AssessmentContext::new(reference, settings.scorer.clone());
    Ok(match variant {
        ScoringVariant::Basic => context,
        ScoringVariant::Integrated => {
            let projection = ProjectionContext::build(&context.reference, &settings.projection)?;
            context.with_projection(projection)
        }
    })
}

fn print_header(title: &str) {
    info!("{}", "=".repeat(60));
    info!("{}", title);
    info!("Analysis Date: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    info!("{}", "=".repeat(60));
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let reference = load_reference(args.reference.as_deref())?;

    match args.command {
        Command::Assess {
            lat,
            lon,
            magnitude,
            depth,
            variant,
            auto,
            output,
        } => {
            let latitude = match lat {
                Some(v) => v,
                None => prompt_coordinate("Latitude (-90 to 90)")?,
            };
            let longitude = match lon {
                Some(v) => v,
                None => prompt_coordinate("Longitude (-180 to 180)")?,
            };

            let context = scoring_context(reference, &settings, variant)?;
            let location = GeoPoint::new(latitude, longitude);

            let estimate: LocationEstimate = estimate::estimate_location(&context, location);
            let magnitude = match (magnitude, auto) {
                (Some(m), _) => m,
                (None, true) => estimate.magnitude,
                (None, false) => prompt_with_default("Expected magnitude (3.0-8.0)", estimate.magnitude)?,
            };
            let depth = match (depth, auto) {
                (Some(d), _) => d,
                (None, true) => estimate.depth_km,
                (None, false) => prompt_with_default("Expected depth in km (1-100)", estimate.depth_km)?,
            };

            print_header("Earthquake Risk Assessment");
            let query = QueryPoint::new(latitude, longitude)
                .with_magnitude(magnitude)
                .with_depth(depth);
            let assessment = context.assess(&query, variant);
            println!("{}", AssessmentReport(&assessment));

            if let Some(path) = output {
                write_json(
                    &path,
                    &AssessmentOutput {
                        generated_at: Utc::now(),
                        assessment: &assessment,
                    },
                )?;
            }
        }

        Command::Samples { variant } => {
            print_header("Sample Location Analysis");
            let context = scoring_context(reference, &settings, variant)?;

            let rows: Vec<(String, RiskAssessment)> = SAMPLE_LOCATIONS
                .iter()
                .map(|s| {
                    info!("Analyzing: {}", s.name);
                    (s.name.to_string(), context.assess(&s.query, variant))
                })
                .collect();

            for (name, assessment) in &rows {
                println!("\n{}", name);
                println!("{}", AssessmentReport(assessment));
            }
            println!("{}", SummaryTable(&rows));
        }

        Command::Plates {
            years,
            resolution,
            threshold,
            top,
            output,
        } => {
            let mut config = settings.report.clone();
            if let Some(years) = years {
                config.years = years;
            }
            if let Some(resolution) = resolution {
                config.resolution_deg = resolution;
            }
            if let Some(threshold) = threshold {
                config.hotspot_threshold = threshold;
            }

            print_header("Tectonic Plate Movement Analysis");
            let projection = ProjectionContext::build(&reference, &config)?;
            println!("{}", ProjectionReport { context: &projection, top });

            if let Some(path) = output {
                write_json(&path, &projection)?;
            }
        }

        Command::Estimate { lat, lon } => {
            let context = AssessmentContext::new(reference, settings.scorer.clone());
            let estimate = estimate::estimate_location(&context, GeoPoint::new(lat, lon));
            println!("{}", EstimateReport(&estimate));
        }

        Command::Feed {
            days,
            min_magnitude,
            timeout,
            top,
        } => {
            let feed_config = FeedConfig {
                days_back: days.unwrap_or(settings.feed.days_back),
                min_magnitude: min_magnitude.unwrap_or(settings.feed.min_magnitude),
                timeout_sec: timeout.unwrap_or(settings.feed.timeout_sec),
                ..settings.feed.clone()
            };

            print_header("Recent Earthquake Risk Ranking");
            let feed = QuakeFeed::new(feed_config)?;
            let catalogue = feed.fetch_or_synthesize().await;
            info!("{} events from {} catalogue", catalogue.events.len(), catalogue.source);

            let context = AssessmentContext::new(reference, settings.scorer.clone());
            let rows: Vec<_> = catalogue
                .events
                .into_iter()
                .map(|event| {
                    let query = QueryPoint::new(event.latitude, event.longitude)
                        .with_magnitude(event.magnitude)
                        .with_depth(event.depth_km);
                    let assessment = context.assess(&query, ScoringVariant::Basic);
                    (event, assessment)
                })
                .collect();

            println!("{}", EventRanking { rows: &rows, top });
        }

        Command::Features {
            samples,
            seed,
            columns,
            output,
        } => {
            let context = AssessmentContext::new(reference, settings.scorer.clone());
            let projections = projection::project(&context.reference, FEATURE_PROJECTION_YEARS);
            let events = quake_feed::synthetic_catalogue(samples, seed);

            let rows = features::extract_catalogue(&context, &projections, &events);

            let columns: Vec<&str> = if columns.is_empty() {
                FEATURE_COLUMNS.to_vec()
            } else {
                columns.iter().map(String::as_str).collect()
            };
            let matrix = features::to_matrix(&rows, &columns);

            write_json(
                &output,
                &FeatureOutput {
                    generated_at: Utc::now(),
                    seed,
                    columns: &columns,
                    rows: matrix,
                },
            )?;
            info!("Wrote {} rows x {} columns", rows.len(), columns.len());
        }

        Command::ExportMap { output, hotspots } => {
            let hotspot_list = if hotspots {
                Some(ProjectionContext::build(&reference, &settings.projection)?.hotspots)
            } else {
                None
            };

            let collection = export::geological_map(&reference, hotspot_list.as_deref());
            export::write_geojson(&output, &collection)?;
            info!("Exported {} features", collection.features.len());
        }
    }

    Ok(())
}
