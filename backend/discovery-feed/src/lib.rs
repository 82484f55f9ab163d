//! Discovery feed engine
//!
//! Filters and ranks geotagged content items for a viewer, resolves where the
//! viewer is, keeps at most one feed video playing at a time and reports a
//! single "viewed" event per tile mount.

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod playback;
pub mod services;
pub mod telemetry;
pub mod tracking;

pub use config::DiscoveryConfig;
pub use error::{DiscoveryError, Result};
pub use models::{
    Category, ContentItem, Coord, FeedQuery, LocationSource, SortPolicy, ViewerLocation,
};
pub use playback::{
    ElementHandle, MediaElement, PlaybackCoordinator, PlaybackEnvironment, SlotState,
    TileAudience, VisibilityEntry,
};
pub use services::{compose, filter, rank, FeedEntry, LocationResolver, ResolutionOutcome};
pub use tracking::ViewTracker;
