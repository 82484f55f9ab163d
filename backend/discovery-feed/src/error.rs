//! Error types for the discovery feed engine
//!
//! Only collaborator clients and configuration return these. The resolver,
//! filter, ranker, coordinator and tracker degrade to "no change" instead.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DiscoveryError>;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Geocoding error: {0}")]
    Geocode(#[from] GeocodeError),

    #[error("Device position error: {0}")]
    Position(#[from] PositionError),

    #[error("Analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("Ratio for {key} must be within (0, 1], got {value}")]
    RatioOutOfRange { key: &'static str, value: f64 },
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    /// The geocoding service answered with an `{error, message}` payload
    #[error("Lookup failed ({error}): {message}")]
    Lookup { error: String, message: String },

    #[error("Geocoding request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Geocoding request timed out")]
    Timeout,

    #[error("Geocoder returned an invalid coordinate ({lat}, {lng})")]
    InvalidCoordinate { lat: f64, lng: f64 },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PositionError {
    #[error("User denied geolocation permission")]
    PermissionDenied,

    #[error("Position unavailable")]
    PositionUnavailable,

    #[error("Geolocation request timed out")]
    Timeout,
}

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Analytics request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Analytics sink rejected event with status {0}")]
    Rejected(u16),

    #[error("No async runtime available to deliver the event")]
    NoRuntime,
}

/// The runtime refused to start playback (autoplay policy)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Playback rejected: {reason}")]
pub struct PlayRejected {
    pub reason: String,
}

impl PlayRejected {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
