use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    pub geocoder: GeocoderConfig,
    pub analytics: AnalyticsConfig,
    pub location: LocationConfig,
    pub playback: PlaybackConfig,
    pub tracking: TrackingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocoderConfig {
    pub base_url: String,
    /// Country code sent with forward lookups
    pub country_code: String,
    pub timeout_secs: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoder_base_url(),
            country_code: default_country_code(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            endpoint: default_analytics_endpoint(),
            timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    pub device_timeout_secs: u64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            device_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Visibility ratio at which a tile starts playing
    pub activation_ratio: f64,
    /// Viewports narrower than this are treated as constrained
    pub mobile_breakpoint_px: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            activation_ratio: 1.0,
            mobile_breakpoint_px: 768,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Visibility ratio at which a tile counts as viewed
    pub view_threshold: f64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            view_threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl DiscoveryConfig {
    /// Load from the process environment (and `.env` if present)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; missing keys take defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = DiscoveryConfig::default();

        let config = DiscoveryConfig {
            geocoder: GeocoderConfig {
                base_url: lookup("GEOCODER_BASE_URL").unwrap_or(defaults.geocoder.base_url),
                country_code: lookup("GEOCODER_COUNTRY_CODE")
                    .map(|c| c.to_ascii_uppercase())
                    .unwrap_or(defaults.geocoder.country_code),
                timeout_secs: parse_or(
                    &lookup,
                    "GEOCODER_TIMEOUT_SECS",
                    defaults.geocoder.timeout_secs,
                )?,
            },
            analytics: AnalyticsConfig {
                endpoint: lookup("ANALYTICS_ENDPOINT").unwrap_or(defaults.analytics.endpoint),
                timeout_secs: parse_or(
                    &lookup,
                    "ANALYTICS_TIMEOUT_SECS",
                    defaults.analytics.timeout_secs,
                )?,
            },
            location: LocationConfig {
                device_timeout_secs: parse_or(
                    &lookup,
                    "DEVICE_POSITION_TIMEOUT_SECS",
                    defaults.location.device_timeout_secs,
                )?,
            },
            playback: PlaybackConfig {
                activation_ratio: ratio_or(
                    &lookup,
                    "PLAYBACK_ACTIVATION_RATIO",
                    defaults.playback.activation_ratio,
                )?,
                mobile_breakpoint_px: parse_or(
                    &lookup,
                    "MOBILE_BREAKPOINT_PX",
                    defaults.playback.mobile_breakpoint_px,
                )?,
            },
            tracking: TrackingConfig {
                view_threshold: ratio_or(
                    &lookup,
                    "VIEW_THRESHOLD_RATIO",
                    defaults.tracking.view_threshold,
                )?,
            },
            logging: LoggingConfig {
                level: lookup("LOG_LEVEL").unwrap_or(defaults.logging.level),
                json: lookup("LOG_FORMAT")
                    .map(|f| f.eq_ignore_ascii_case("json"))
                    .unwrap_or(defaults.logging.json),
            },
        };

        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

fn ratio_or<F>(lookup: &F, key: &'static str, default: f64) -> Result<f64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value: f64 = parse_or(lookup, key, default)?;
    if value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(ConfigError::RatioOutOfRange { key, value })
    }
}

fn default_geocoder_base_url() -> String {
    "http://localhost:8090".to_string()
}

fn default_country_code() -> String {
    "NL".to_string()
}

fn default_analytics_endpoint() -> String {
    "http://localhost:8091/api/v1/events".to_string()
}
