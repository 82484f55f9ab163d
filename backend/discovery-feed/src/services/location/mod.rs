//! Viewer location resolution
//!
//! Three sources feed one canonical `ViewerLocation`:
//! - the stored profile location
//! - a manually entered "postcode,house-number" resolved by the geocoder
//! - a single high-accuracy device position reading
//!
//! Every resolution replaces the previous location wholesale. Resolutions can
//! overlap; each takes a ticket when it starts and its result is adopted only
//! if no newer resolution (or `clear`) started in the meantime. Failures never
//! propagate: the previous location is kept and the failure is logged.

pub mod address;

pub use address::ManualAddress;

use crate::clients::{AddressQuery, DevicePositionProvider, Geocoder, PositionOptions};
use crate::config::DiscoveryConfig;
use crate::error::PositionError;
use crate::models::{Coord, LocationSource, ViewerLocation};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The profile fields the resolver cares about
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewerProfile {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl ViewerProfile {
    pub fn coord(&self) -> Option<Coord> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coord::new(lat, lng)).filter(Coord::is_valid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionOutcome {
    /// Adopted as the current location
    Resolved(ViewerLocation),
    /// Malformed input, nothing was requested
    Rejected,
    /// The source has no coordinates to offer
    Unavailable,
    /// The collaborator failed; the previous location is kept
    Failed,
    /// A newer resolution started first; this result was discarded
    Superseded,
}

impl ResolutionOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolutionOutcome::Resolved(_))
    }
}

#[derive(Debug, Default)]
struct ResolverState {
    current: Option<ViewerLocation>,
    latest_ticket: u64,
}

pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
    device: Arc<dyn DevicePositionProvider>,
    country_code: String,
    device_timeout: Duration,
    state: Mutex<ResolverState>,
}

impl LocationResolver {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        device: Arc<dyn DevicePositionProvider>,
        config: &DiscoveryConfig,
    ) -> Self {
        Self {
            geocoder,
            device,
            country_code: config.geocoder.country_code.clone(),
            device_timeout: Duration::from_secs(config.location.device_timeout_secs),
            state: Mutex::new(ResolverState::default()),
        }
    }

    /// Snapshot of the current location
    pub fn current(&self) -> Option<ViewerLocation> {
        self.state.lock().current.clone()
    }

    /// Viewer removed location filtering. Also invalidates in-flight lookups.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.latest_ticket += 1;
        if state.current.take().is_some() {
            info!("Viewer location cleared");
        }
    }

    pub fn use_profile_location(&self, profile: &ViewerProfile) -> ResolutionOutcome {
        let Some(coord) = profile.coord() else {
            debug!("Profile has no usable coordinates");
            return ResolutionOutcome::Unavailable;
        };

        let ticket = self.begin();
        self.adopt(ticket, ViewerLocation::new(coord, LocationSource::Profile))
    }

    pub async fn use_manual_address(&self, raw: &str) -> ResolutionOutcome {
        let Some(address) = ManualAddress::parse(raw) else {
            debug!("Manual address rejected before lookup");
            return ResolutionOutcome::Rejected;
        };

        let ticket = self.begin();
        let result = self.geocoder.lookup_postcode(&address.to_query()).await;

        match result {
            Ok(found) => {
                let mut location = ViewerLocation::new(found.coord(), LocationSource::Manual);
                location.formatted_address = found.formatted_address;
                self.adopt(ticket, location)
            }
            Err(e) => {
                warn!(postcode = %address.postcode, error = %e, "Postcode lookup failed");
                ResolutionOutcome::Failed
            }
        }
    }

    /// Forward lookup of a free-form address in the configured country
    pub async fn use_address_lookup(&self, address: &str, city: &str) -> ResolutionOutcome {
        let address = address.trim();
        if address.is_empty() {
            return ResolutionOutcome::Rejected;
        }

        let query = AddressQuery {
            address: address.to_string(),
            city: city.trim().to_string(),
            country_code: self.country_code.clone(),
        };

        let ticket = self.begin();
        match self.geocoder.lookup_address(&query).await {
            Ok(found) => {
                let mut location = ViewerLocation::new(found.coord(), LocationSource::Manual);
                location.formatted_address = found.formatted_address;
                self.adopt(ticket, location)
            }
            Err(e) => {
                warn!(error = %e, "Address lookup failed");
                ResolutionOutcome::Failed
            }
        }
    }

    pub async fn use_device_position(&self) -> ResolutionOutcome {
        let options = PositionOptions::single_shot(self.device_timeout);
        let ticket = self.begin();

        let reading = tokio::time::timeout(options.timeout, self.device.current_position(options))
            .await
            .unwrap_or(Err(PositionError::Timeout));

        match reading {
            Ok(coord) if coord.is_valid() => {
                self.adopt(ticket, ViewerLocation::new(coord, LocationSource::Device))
            }
            Ok(coord) => {
                warn!(lat = coord.lat, lng = coord.lng, "Device reported an invalid position");
                ResolutionOutcome::Failed
            }
            Err(e) => {
                warn!(error = %e, "Device position unavailable");
                ResolutionOutcome::Failed
            }
        }
    }

    fn begin(&self) -> u64 {
        let mut state = self.state.lock();
        state.latest_ticket += 1;
        state.latest_ticket
    }

    fn adopt(&self, ticket: u64, location: ViewerLocation) -> ResolutionOutcome {
        let mut state = self.state.lock();
        if ticket != state.latest_ticket {
            debug!(
                ticket,
                latest = state.latest_ticket,
                source = %location.source,
                "Discarding stale location result"
            );
            return ResolutionOutcome::Superseded;
        }

        info!(source = %location.source, "Viewer location updated");
        state.current = Some(location.clone());
        ResolutionOutcome::Resolved(location)
    }
}
