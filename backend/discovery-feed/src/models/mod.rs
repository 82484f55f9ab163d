//! Core feed data models
//!
//! Shared data structures for the filter, ranker, location resolver and
//! playback/tracking state machines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Highest value an average rating can take.
pub const MAX_RATING: f64 = 5.0;

/// Geographic coordinate (WGS84 degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lng: f64,
}

impl Coord {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Latitude within [-90, 90] and longitude within [-180, 180]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

impl From<(f64, f64)> for Coord {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

/// Closed category tag set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Culinary,
    Grown,
    Crafted,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Culinary => "CULINARY",
            Category::Grown => "GROWN",
            Category::Crafted => "CRAFTED",
        }
    }
}

impl FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CULINARY" => Ok(Category::Culinary),
            "GROWN" => Ok(Category::Grown),
            "CRAFTED" => Ok(Category::Crafted),
            _ => Err(UnknownVariant {
                kind: "category",
                value: s.to_string(),
            }),
        }
    }
}

/// Returned when a category or sort policy name is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub display_name: String,
    pub handle: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub url: String,
    #[serde(default)]
    pub is_main: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub url: String,
    pub thumbnail_url: Option<String>,
}

/// Media attached to an item: ordered photos plus at most one primary video
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    #[serde(default)]
    pub photos: Vec<Photo>,
    pub video: Option<Video>,
}

/// One discoverable unit in the feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: Uuid,
    pub category: Category,
    pub subcategory: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub author: Author,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub location: Option<Coord>,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub props_count: u64,
    #[serde(default)]
    pub review_count: u64,
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub media: Media,
}

impl ContentItem {
    pub fn has_video(&self) -> bool {
        self.media.video.is_some()
    }

    /// The flagged main photo, falling back to the first photo
    pub fn main_photo(&self) -> Option<&Photo> {
        self.media
            .photos
            .iter()
            .find(|p| p.is_main)
            .or_else(|| self.media.photos.first())
    }

    /// No photo and no video: the tile renders the category icon instead
    pub fn is_icon_only(&self) -> bool {
        self.media.photos.is_empty() && self.media.video.is_none()
    }

    /// Average rating clamped to [0, 5]; missing, NaN or unreviewed reads as 0
    pub fn rating_or_zero(&self) -> f64 {
        if self.review_count == 0 {
            return 0.0;
        }
        match self.average_rating {
            Some(r) if r.is_finite() => r.clamp(0.0, MAX_RATING),
            _ => 0.0,
        }
    }
}

/// Provenance of a resolved viewer location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationSource {
    Profile,
    Manual,
    Device,
}

impl LocationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationSource::Profile => "profile",
            LocationSource::Manual => "manual",
            LocationSource::Device => "device",
        }
    }
}

impl fmt::Display for LocationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerLocation {
    pub lat: f64,
    pub lng: f64,
    pub source: LocationSource,
    /// Human-readable address, only set by geocoded resolutions
    pub formatted_address: Option<String>,
}

impl ViewerLocation {
    pub fn new(coord: Coord, source: LocationSource) -> Self {
        Self {
            lat: coord.lat,
            lng: coord.lng,
            source,
            formatted_address: None,
        }
    }

    pub fn with_formatted_address(mut self, address: impl Into<String>) -> Self {
        self.formatted_address = Some(address.into());
        self
    }

    pub fn coord(&self) -> Coord {
        Coord::new(self.lat, self.lng)
    }
}

/// Ordering policy applied by the ranker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortPolicy {
    #[default]
    Newest,
    Distance,
    Views,
    Rating,
    Props,
    Popular,
}

impl SortPolicy {
    pub const ALL: [SortPolicy; 6] = [
        SortPolicy::Newest,
        SortPolicy::Distance,
        SortPolicy::Views,
        SortPolicy::Rating,
        SortPolicy::Props,
        SortPolicy::Popular,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortPolicy::Newest => "newest",
            SortPolicy::Distance => "distance",
            SortPolicy::Views => "views",
            SortPolicy::Rating => "rating",
            SortPolicy::Props => "props",
            SortPolicy::Popular => "popular",
        }
    }
}

impl FromStr for SortPolicy {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        SortPolicy::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| UnknownVariant {
                kind: "sort policy",
                value: s.to_string(),
            })
    }
}

/// Active filter and sort parameters. `None` is the "all" sentinel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeedQuery {
    #[serde(deserialize_with = "all_sentinel")]
    pub category: Option<Category>,
    #[serde(deserialize_with = "all_sentinel")]
    pub subcategory: Option<String>,
    #[serde(deserialize_with = "all_sentinel")]
    pub region: Option<String>,
    pub search: String,
    pub min_views: u64,
    pub min_props: u64,
    pub min_rating: f64,
    /// Kilometers; 0 disables distance filtering
    pub radius_km: f64,
    pub sort: SortPolicy,
}

impl FeedQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = normalize_all(subcategory.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = normalize_all(region.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_min_views(mut self, min_views: u64) -> Self {
        self.min_views = min_views;
        self
    }

    pub fn with_min_props(mut self, min_props: u64) -> Self {
        self.min_props = min_props;
        self
    }

    pub fn with_min_rating(mut self, min_rating: f64) -> Self {
        self.min_rating = min_rating;
        self
    }

    pub fn with_radius_km(mut self, radius_km: f64) -> Self {
        self.radius_km = radius_km;
        self
    }

    pub fn with_sort(mut self, sort: SortPolicy) -> Self {
        self.sort = sort;
        self
    }
}

fn normalize_all(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Accepts `null`, a missing field, or the literal `"all"` as the sentinel
fn all_sentinel<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.and_then(normalize_all) {
        None => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
