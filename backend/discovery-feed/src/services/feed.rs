//! Filter + rank in one pass, annotated for display

use crate::models::{ContentItem, FeedQuery, ViewerLocation};
use crate::services::filter::filter;
use crate::services::geo::{distance_km, round_km};
use crate::services::ranking::rank;
use serde::Serialize;
use tracing::debug;

/// A ranked item plus its display distance from the viewer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    pub item: ContentItem,
    /// Kilometers rounded to one decimal; `None` when either side lacks a location
    pub distance_km: Option<f64>,
}

/// Recompute the visible feed. Pure function of its inputs.
pub fn compose(
    items: Vec<ContentItem>,
    query: &FeedQuery,
    viewer: Option<&ViewerLocation>,
) -> Vec<FeedEntry> {
    let total = items.len();
    let filtered = filter(items, query, viewer);
    let ranked = rank(filtered, query.sort, viewer);

    debug!(
        total,
        shown = ranked.len(),
        sort = query.sort.as_str(),
        "Feed composed"
    );

    ranked
        .into_iter()
        .map(|item| {
            let distance_km = match (viewer, item.location) {
                (Some(v), Some(loc)) => Some(round_km(distance_km(v.coord(), loc))),
                _ => None,
            };
            FeedEntry { item, distance_km }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Author, Category, Coord, LocationSource, Media, SortPolicy};
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn item(title: &str, location: Option<Coord>, hours_ago: i64) -> ContentItem {
        ContentItem {
            id: Uuid::new_v4(),
            category: Category::Crafted,
            subcategory: None,
            title: title.to_string(),
            description: None,
            author: Author {
                display_name: "Maker".to_string(),
                handle: "maker".to_string(),
            },
            tags: vec![],
            created_at: Utc::now() - Duration::hours(hours_ago),
            location,
            view_count: 0,
            props_count: 0,
            review_count: 0,
            average_rating: None,
            media: Media::default(),
        }
    }

    #[test]
    fn test_compose_filters_ranks_and_annotates() {
        let viewer = ViewerLocation::new(Coord::new(52.0, 4.0), LocationSource::Device);
        let items = vec![
            item("mid", Some(Coord::new(52.02, 4.0)), 1),
            item("none", None, 0),
            item("near", Some(Coord::new(52.01, 4.01)), 2),
        ];
        let query = FeedQuery::new()
            .with_radius_km(5.0)
            .with_sort(SortPolicy::Distance);

        let feed = compose(items, &query, Some(&viewer));

        let titles: Vec<&str> = feed.iter().map(|e| e.item.title.as_str()).collect();
        assert_eq!(titles, vec!["near", "mid"]);
        assert_eq!(feed[0].distance_km, Some(1.3));
        assert_eq!(feed[1].distance_km, Some(2.2));
    }

    #[test]
    fn test_compose_without_viewer_has_no_distances() {
        let items = vec![item("a", Some(Coord::new(52.0, 4.0)), 3), item("b", None, 1)];
        let feed = compose(items, &FeedQuery::new(), None);

        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].item.title, "b");
        assert!(feed.iter().all(|e| e.distance_km.is_none()));
    }
}
