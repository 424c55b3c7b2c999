//! Recent earthquake catalogue from the USGS FDSN event service
//!
//! A single best-effort request per call. Any failure (transport, non-2xx
//! status, malformed body) falls back to a seeded synthetic catalogue so
//! callers always get events to work with.
//!
//! ```rust,ignore
//! let feed = QuakeFeed::new(FeedConfig::default())?;
//! let catalogue = feed.fetch_or_synthesize().await;
//! println!("{} events from {}", catalogue.events.len(), catalogue.source);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod synthetic;
pub mod usgs;

pub use synthetic::synthetic_catalogue;
pub use usgs::{parse_usgs_geojson, QuakeFeed};

/// USGS FDSN event query endpoint
pub const USGS_EVENT_URL: &str = "https://earthquake.usgs.gov/fdsnws/event/1/query";

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("HTTP client error: {0}")]
    Client(String),
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("API returned status {0}")]
    ApiStatus(u16),
    #[error("Query window of {0} days is out of range")]
    InvalidWindow(i64),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FeedError>;

/// Feed configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Query endpoint
    pub base_url: String,
    /// Window size ending today
    pub days_back: i64,
    pub min_magnitude: f64,
    /// Request timeout in seconds
    pub timeout_sec: u64,
    /// Number of events generated when the request fails
    pub synthetic_samples: usize,
    pub synthetic_seed: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: USGS_EVENT_URL.to_string(),
            days_back: 30,
            min_magnitude: 2.000000000,
            timeout_sec: 10,
            synthetic_samples: 1000,
            synthetic_seed: 42,
        }
    }
}

/// A single catalogue event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeismicEvent {
    pub magnitude: f64,
    pub depth_km: f64,
    pub latitude: f64,
    pub longitude: f64,
    /// Origin time in milliseconds since the Unix epoch
    pub time_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
}

impl SeismicEvent {
    pub fn origin_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.time_ms)
    }
}

/// Where a catalogue came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    Usgs,
    Synthetic,
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventSource::Usgs => f.write_str("USGS"),
            EventSource::Synthetic => f.write_str("synthetic"),
        }
    }
}

/// Events plus their provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalogue {
    pub source: EventSource,
    pub events: Vec<SeismicEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FeedConfig::default();
        assert_eq!(config.days_back, 30);
        assert_eq!(config.min_magnitude, 2.0);
        assert_eq!(config.timeout_sec, 10);
        assert!(config.base_url.starts_with("https://earthquake.usgs.gov"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: FeedConfig = serde_json::from_str(r#"{"days_back": 7}"#).unwrap();
        assert_eq!(config.days_back, 7);
        assert_eq!(config.synthetic_seed, 42);
    }

    #[test]
    fn test_origin_time() {
        let event = SeismicEvent {
            magnitude: 5.0,
            depth_km: 10.0,
            latitude: 0.0,
            longitude: 0.0,
            time_ms: 1_700_000_000_000,
            place: None,
        };
        let time = event.origin_time().unwrap();
        assert_eq!(time.format("%Y-%m-%d").to_string(), "2023-11-14");
    }
}
