//! USGS FDSN event client

use crate::{synthetic, Catalogue, EventSource, FeedConfig, FeedError, Result, SeismicEvent};
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct UsgsResponse {
    features: Vec<UsgsFeature>,
}

#[derive(Debug, Deserialize)]
struct UsgsFeature {
    #[serde(default)]
    properties: UsgsProperties,
    geometry: UsgsGeometry,
}

#[derive(Debug, Default, Deserialize)]
struct UsgsProperties {
    mag: Option<f64>,
    time: Option<i64>,
    place: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsgsGeometry {
    /// [longitude, latitude, depth]
    coordinates: Vec<f64>,
}

/// Parse a USGS GeoJSON event response
///
/// Missing magnitude or depth become 0. Features with fewer than two
/// coordinates are skipped.
pub fn parse_usgs_geojson(body: &str) -> Result<Vec<SeismicEvent>> {
    let response: UsgsResponse = serde_json::from_str(body)?;

    let mut skipped = 0;
    let events: Vec<SeismicEvent> = response
        .features
        .into_iter()
        .filter_map(|f| {
            let coords = &f.geometry.coordinates;
            if coords.len() < 2 {
                skipped += 1;
                return None;
            }
            Some(SeismicEvent {
                magnitude: f.properties.mag.unwrap_or(0.0),
                depth_km: coords.get(2).copied().unwrap_or(0.0),
                latitude: coords[1],
                longitude: coords[0],
                time_ms: f.properties.time.unwrap_or(0),
                place: f.properties.place,
            })
        })
        .collect();

    if skipped > 0 {
        warn!("Skipped {} USGS features without coordinates", skipped);
    }

    Ok(events)
}

/// USGS event feed client
pub struct QuakeFeed {
    config: FeedConfig,
    client: reqwest::Client,
}

impl QuakeFeed {
    pub fn new(config: FeedConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_sec))
            .build()
            .map_err(|e| FeedError::Client(e.to_string()))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Query URL for the window ending on `end`
    ///
    /// Negative windows, and windows reaching past the earliest
    /// representable date, are rejected.
    pub fn query_url(&self, end: NaiveDate) -> Result<String> {
        let days = self.config.days_back;
        let start = Duration::try_days(days)
            .filter(|_| days >= 0)
            .and_then(|window| end.checked_sub_signed(window))
            .ok_or(FeedError::InvalidWindow(days))?;

        Ok(format!(
            "{}?format=geojson&starttime={}&endtime={}&minmagnitude={}",
            self.config.base_url,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
            self.config.min_magnitude
        ))
    }

    /// Fetch recent events, failing on any transport, status or parse error
    pub async fn fetch_recent(&self) -> Result<Vec<SeismicEvent>> {
        let url = self.query_url(Utc::now().date_naive())?;
        info!("Fetching earthquakes: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FeedError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FeedError::ApiStatus(response.status().as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FeedError::RequestFailed(e.to_string()))?;

        let events = parse_usgs_geojson(&body)?;
        info!("Fetched {} earthquake records", events.len());
        Ok(events)
    }

    /// Fetch recent events, substituting a synthetic catalogue on failure
    pub async fn fetch_or_synthesize(&self) -> Catalogue {
        match self.fetch_recent().await {
            Ok(events) => Catalogue {
                source: EventSource::Usgs,
                events,
            },
            Err(e) => {
                warn!("Earthquake feed unavailable ({}), using synthetic catalogue", e);
                Catalogue {
                    source: EventSource::Synthetic,
                    events: synthetic::synthetic_catalogue(
                        self.config.synthetic_samples,
                        self.config.synthetic_seed,
                    ),
                }
            }
        }
    }
}
