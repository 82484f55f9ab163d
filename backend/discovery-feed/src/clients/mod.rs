//! External collaborators: geocoding, device position and analytics.
//!
//! Each is a trait seam the host implements or mocks, plus a `reqwest`
//! implementation for the HTTP-backed ones.

pub mod analytics;
pub mod device;
pub mod geocoding;

pub use analytics::{AnalyticsSink, HttpAnalyticsSink, ViewEvent};
pub use device::{DevicePositionProvider, PositionOptions};
pub use geocoding::{AddressQuery, GeocodeResult, Geocoder, HttpGeocoder, PostcodeQuery};

use crate::config::DiscoveryConfig;
use std::sync::Arc;

/// HTTP-backed collaborators built from configuration
#[derive(Clone)]
pub struct HttpCollaborators {
    pub geocoder: Arc<HttpGeocoder>,
    pub analytics: Arc<HttpAnalyticsSink>,
}

impl HttpCollaborators {
    pub fn from_config(config: &DiscoveryConfig) -> crate::Result<Self> {
        Ok(Self {
            geocoder: Arc::new(HttpGeocoder::new(&config.geocoder)?),
            analytics: Arc::new(HttpAnalyticsSink::new(&config.analytics)?),
        })
    }
}
