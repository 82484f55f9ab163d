//! Integration tests: filter → rank → compose
//!
//! Coverage:
//! - Radius filtering never admits items without a location
//! - Every item kept by radius filtering is within the radius
//! - `newest` ordering is idempotent and matches descending created_at
//! - `distance` without a viewer location equals `newest`
//! - Worked scenarios for views/newest and the 5 km radius case

mod common;

use chrono::{Duration, Utc};
use common::{item, item_at, titles};
use discovery_feed::models::{Coord, FeedQuery, LocationSource, SortPolicy, ViewerLocation};
use discovery_feed::services::{compose, distance_km, filter, rank};

fn viewer(lat: f64, lng: f64) -> ViewerLocation {
    ViewerLocation::new(Coord::new(lat, lng), LocationSource::Device)
}

/// Deterministic spread of items around (52.0, 4.0), every fourth without location
fn scattered_items(n: usize) -> Vec<discovery_feed::ContentItem> {
    (0..n)
        .map(|i| {
            let location = if i % 4 == 3 {
                None
            } else {
                let step = i as f64 * 0.013;
                Some(Coord::new(52.0 + step.sin() * 0.2, 4.0 + (step * 1.7).cos() * 0.3))
            };
            let mut it = item_at(&format!("item-{i}"), (i % 7) as i64, location);
            it.view_count = (i * 37 % 101) as u64;
            it.props_count = (i * 11 % 13) as u64;
            it
        })
        .collect()
}

#[test]
fn test_radius_never_admits_unlocated_items() {
    let items = scattered_items(120);
    let origin = viewer(52.0, 4.0);

    for radius in [0.5, 2.0, 5.0, 15.0, 50.0, 500.0] {
        let query = FeedQuery::new().with_radius_km(radius);
        let kept = filter(items.clone(), &query, Some(&origin));

        for it in &kept {
            let loc = it.location.expect("radius filtering kept an item without location");
            assert!(distance_km(origin.coord(), loc) <= radius + 1e-9);
        }
    }
}

#[test]
fn test_radius_keeps_all_located_items_when_large() {
    let items = scattered_items(40);
    let located = items.iter().filter(|i| i.location.is_some()).count();

    let kept = filter(
        items,
        &FeedQuery::new().with_radius_km(1000.0),
        Some(&viewer(52.0, 4.0)),
    );
    assert_eq!(kept.len(), located);
}

#[test]
fn test_scenario_radius_five_km() {
    let a = item_at("A", 1, Some(Coord::new(52.01, 4.01)));
    let b = item_at("B", 1, None);

    let kept = filter(
        vec![a, b],
        &FeedQuery::new().with_radius_km(5.0),
        Some(&viewer(52.0, 4.0)),
    );
    assert_eq!(titles(&kept), vec!["A"]);
}

#[test]
fn test_scenario_views_then_newest() {
    let t1 = Utc::now() - Duration::hours(3);
    let t2 = Utc::now() - Duration::hours(1);
    let mut a = item("A", t2);
    a.view_count = 10;
    let mut b = item("B", t1);
    b.view_count = 50;

    let items = vec![a, b];
    assert_eq!(titles(&rank(items.clone(), SortPolicy::Views, None)), vec!["B", "A"]);
    assert_eq!(titles(&rank(items, SortPolicy::Newest, None)), vec!["A", "B"]);
}

#[test]
fn test_newest_is_descending_and_idempotent() {
    let items = scattered_items(60);
    let once = rank(items, SortPolicy::Newest, None);

    assert!(once
        .windows(2)
        .all(|pair| pair[0].created_at >= pair[1].created_at));

    let twice = rank(once.clone(), SortPolicy::Newest, None);
    assert_eq!(titles(&once), titles(&twice));
}

#[test]
fn test_every_policy_is_idempotent() {
    let origin = viewer(52.0, 4.0);
    let items = scattered_items(50);

    for policy in SortPolicy::ALL {
        let once = rank(items.clone(), policy, Some(&origin));
        let twice = rank(once.clone(), policy, Some(&origin));
        assert_eq!(titles(&once), titles(&twice), "policy {policy:?}");
        assert_eq!(once.len(), items.len());
    }
}

#[test]
fn test_distance_without_viewer_matches_newest() {
    let items = scattered_items(45);
    let by_distance = rank(items.clone(), SortPolicy::Distance, None);
    let by_newest = rank(items, SortPolicy::Newest, None);
    assert_eq!(titles(&by_distance), titles(&by_newest));
}

#[test]
fn test_distance_policy_orders_ascending_with_unlocated_last() {
    let origin = viewer(52.0, 4.0);
    let ranked = rank(scattered_items(30), SortPolicy::Distance, Some(&origin));

    let first_unlocated = ranked
        .iter()
        .position(|i| i.location.is_none())
        .unwrap_or(ranked.len());
    assert!(ranked[first_unlocated..].iter().all(|i| i.location.is_none()));

    let distances: Vec<f64> = ranked[..first_unlocated]
        .iter()
        .map(|i| distance_km(origin.coord(), i.location.unwrap()))
        .collect();
    assert!(distances.windows(2).all(|d| d[0] <= d[1]));
}

#[test]
fn test_compose_from_json_feed() {
    let raw = r#"[
        {"id":"0b6f7f7e-1f3c-4f7b-9d55-5d0c1a1e1a01","category":"GROWN","subcategory":"Herbs",
         "title":"Basil","description":"Fresh from the balcony",
         "author":{"displayName":"Noor","handle":"noor"},"tags":["Utrecht"],
         "createdAt":"2026-09-01T08:00:00Z","location":{"lat":52.09,"lng":5.12},
         "viewCount":40,"propsCount":4,"reviewCount":2,"averageRating":4.5,
         "media":{"photos":[{"url":"basil.jpg","isMain":true}]}},
        {"id":"0b6f7f7e-1f3c-4f7b-9d55-5d0c1a1e1a02","category":"GROWN","subcategory":"Herbs",
         "title":"Mint","author":{"displayName":"Bas","handle":"bas"},"tags":["Utrecht-Oost"],
         "createdAt":"2026-09-02T08:00:00Z","location":{"lat":52.08,"lng":5.14},
         "viewCount":5,"reviewCount":0,"averageRating":null,
         "media":{"photos":[],"video":{"url":"mint.mp4","thumbnailUrl":null}}},
        {"id":"0b6f7f7e-1f3c-4f7b-9d55-5d0c1a1e1a03","category":"CRAFTED",
         "title":"Mug","author":{"displayName":"Kim","handle":"kim"},"tags":["Utrecht"],
         "createdAt":"2026-09-03T08:00:00Z","location":null}
    ]"#;

    let items: Vec<discovery_feed::ContentItem> = serde_json::from_str(raw).unwrap();
    let query: FeedQuery = serde_json::from_str(
        r#"{"category":"GROWN","region":"utrecht","sort":"popular","radiusKm":10}"#,
    )
    .unwrap();

    let feed = compose(items, &query, Some(&viewer(52.09, 5.12)));

    let names: Vec<&str> = feed.iter().map(|e| e.item.title.as_str()).collect();
    assert_eq!(names, vec!["Basil", "Mint"]);
    assert_eq!(feed[0].distance_km, Some(0.0));
    assert!(feed[1].item.has_video());
}
