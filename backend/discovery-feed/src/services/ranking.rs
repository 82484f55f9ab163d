//! Feed ranking
//!
//! Six interchangeable policies. Every policy except `newest` breaks ties by
//! "more recent `created_at` wins"; `newest` keeps input order for equal
//! timestamps. Sorting is stable and every comparator is total: numeric keys
//! are sanitized (NaN -> 0) and compared with `f64::total_cmp`.

use crate::models::{ContentItem, SortPolicy, ViewerLocation};
use crate::services::geo::distance_km;
use std::cmp::Ordering;
use tracing::debug;

/// Weights for the `popular` composite score
const POPULAR_PROPS_WEIGHT: f64 = 2.0;
const POPULAR_REVIEW_WEIGHT: f64 = 3.0;
const POPULAR_RATING_WEIGHT: f64 = 10.0;

/// Order items under `policy`
pub fn rank(
    items: Vec<ContentItem>,
    policy: SortPolicy,
    viewer: Option<&ViewerLocation>,
) -> Vec<ContentItem> {
    let effective = effective_policy(policy, viewer);
    if effective != policy {
        debug!(
            requested = policy.as_str(),
            "No viewer location, distance ranking degrades to newest"
        );
    }

    // Decorate once so scores and distances aren't recomputed per comparison
    let mut keyed: Vec<(f64, ContentItem)> = items
        .into_iter()
        .map(|item| (sort_key(&item, effective, viewer), item))
        .collect();

    keyed.sort_by(|(ka, a), (kb, b)| compare(effective, *ka, a, *kb, b));

    debug!(policy = effective.as_str(), count = keyed.len(), "Feed ranked");
    keyed.into_iter().map(|(_, item)| item).collect()
}

/// `distance` is meaningless without a viewer location
pub fn effective_policy(policy: SortPolicy, viewer: Option<&ViewerLocation>) -> SortPolicy {
    match (policy, viewer) {
        (SortPolicy::Distance, None) => SortPolicy::Newest,
        (policy, _) => policy,
    }
}

/// Composite popularity score; missing rating counts as 0
pub fn popularity_score(item: &ContentItem) -> f64 {
    item.view_count as f64
        + item.props_count as f64 * POPULAR_PROPS_WEIGHT
        + item.review_count as f64 * POPULAR_REVIEW_WEIGHT
        + item.rating_or_zero() * POPULAR_RATING_WEIGHT
}

/// Primary key per policy. Distance uses +inf for items that have no
/// location so they sort last.
fn sort_key(item: &ContentItem, policy: SortPolicy, viewer: Option<&ViewerLocation>) -> f64 {
    let key = match policy {
        SortPolicy::Newest => 0.0,
        SortPolicy::Distance => match (viewer, item.location) {
            (Some(v), Some(loc)) => distance_km(v.coord(), loc),
            _ => f64::INFINITY,
        },
        SortPolicy::Views => item.view_count as f64,
        SortPolicy::Rating => item.rating_or_zero(),
        SortPolicy::Props => item.props_count as f64,
        SortPolicy::Popular => popularity_score(item),
    };

    if key.is_nan() {
        0.0
    } else {
        key
    }
}

fn compare(policy: SortPolicy, ka: f64, a: &ContentItem, kb: f64, b: &ContentItem) -> Ordering {
    let newest_first = b.created_at.cmp(&a.created_at);

    match policy {
        SortPolicy::Newest => newest_first,
        SortPolicy::Distance => ka.total_cmp(&kb).then(newest_first),
        SortPolicy::Views | SortPolicy::Rating | SortPolicy::Props | SortPolicy::Popular => {
            kb.total_cmp(&ka).then(newest_first)
        }
    }
}
