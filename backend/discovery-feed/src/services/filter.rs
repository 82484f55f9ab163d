//! Feed filtering
//!
//! Conjunctive predicates applied in a fixed order:
//! 1. Category / subcategory equality
//! 2. Region tag (substring either direction, case-insensitive)
//! 3. Free-text search over title, description, author name and handle
//! 4. Minimum views / props / rating
//! 5. Distance radius, only when a viewer location is known and radius > 0
//!
//! Input order is preserved so the ranker's stable sort composes with it.

use crate::models::{ContentItem, Coord, FeedQuery, ViewerLocation};
use crate::services::geo::distance_km;
use tracing::debug;

/// Filter owned items, keeping input order
pub fn filter(
    items: Vec<ContentItem>,
    query: &FeedQuery,
    viewer: Option<&ViewerLocation>,
) -> Vec<ContentItem> {
    let predicate = FeedPredicate::new(query, viewer);
    let before = items.len();

    let kept: Vec<ContentItem> = items
        .into_iter()
        .filter(|item| predicate.matches(item))
        .collect();

    debug!(before, after = kept.len(), "Feed filter applied");
    kept
}

/// Query compiled once per recomputation: lowercased needles and the
/// effective radius
struct FeedPredicate<'q> {
    query: &'q FeedQuery,
    subcategory: Option<String>,
    region: Option<String>,
    search: Option<String>,
    radius: Option<(Coord, f64)>,
}

impl<'q> FeedPredicate<'q> {
    fn new(query: &'q FeedQuery, viewer: Option<&ViewerLocation>) -> Self {
        let search = query.search.trim().to_lowercase();
        let radius = match viewer {
            Some(loc) if query.radius_km > 0.0 => Some((loc.coord(), query.radius_km)),
            _ => None,
        };

        Self {
            query,
            subcategory: query.subcategory.as_deref().map(str::to_lowercase),
            region: query.region.as_deref().map(str::to_lowercase),
            search: (!search.is_empty()).then_some(search),
            radius,
        }
    }

    fn matches(&self, item: &ContentItem) -> bool {
        self.matches_category(item)
            && self.matches_region(item)
            && self.matches_search(item)
            && self.meets_thresholds(item)
            && self.within_radius(item)
    }

    fn matches_category(&self, item: &ContentItem) -> bool {
        if let Some(category) = self.query.category {
            if item.category != category {
                return false;
            }
        }

        match &self.subcategory {
            None => true,
            Some(wanted) => item
                .subcategory
                .as_deref()
                .is_some_and(|sub| sub.to_lowercase() == *wanted),
        }
    }

    fn matches_region(&self, item: &ContentItem) -> bool {
        let Some(region) = &self.region else {
            return true;
        };

        item.tags.iter().any(|tag| {
            let tag = tag.to_lowercase();
            !tag.is_empty() && (tag.contains(region.as_str()) || region.contains(tag.as_str()))
        })
    }

    fn matches_search(&self, item: &ContentItem) -> bool {
        let Some(needle) = &self.search else {
            return true;
        };

        let contains = |haystack: &str| haystack.to_lowercase().contains(needle.as_str());

        if contains(&item.title)
            || item.description.as_deref().is_some_and(contains)
            || contains(&item.author.display_name)
            || contains(&item.author.handle)
        {
            return true;
        }

        // "@handle" searches
        needle
            .strip_prefix('@')
            .filter(|h| !h.is_empty())
            .is_some_and(|h| item.author.handle.to_lowercase().contains(h))
    }

    fn meets_thresholds(&self, item: &ContentItem) -> bool {
        item.view_count >= self.query.min_views
            && item.props_count >= self.query.min_props
            && item.rating_or_zero() >= self.query.min_rating
    }

    fn within_radius(&self, item: &ContentItem) -> bool {
        let Some((origin, radius)) = self.radius else {
            return true;
        };

        // Items without a location cannot be proven within radius
        match item.location {
            Some(loc) => distance_km(origin, loc) <= radius,
            None => false,
        }
    }
}
