#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use discovery_feed::clients::{AnalyticsSink, ViewEvent};
use discovery_feed::error::PlayRejected;
use discovery_feed::models::{Author, Category, ContentItem, Coord, Media};
use discovery_feed::playback::{ElementHandle, MediaElement, ObserverFactory, VisibilityObserver};
use parking_lot::Mutex;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use uuid::Uuid;

pub fn item(title: &str, created_at: DateTime<Utc>) -> ContentItem {
    ContentItem {
        id: Uuid::new_v4(),
        category: Category::Culinary,
        subcategory: None,
        title: title.to_string(),
        description: None,
        author: Author {
            display_name: "Test Author".to_string(),
            handle: "test_author".to_string(),
        },
        tags: vec![],
        created_at,
        location: None,
        view_count: 0,
        props_count: 0,
        review_count: 0,
        average_rating: None,
        media: Media::default(),
    }
}

pub fn item_at(title: &str, hours_ago: i64, location: Option<Coord>) -> ContentItem {
    let mut item = item(title, Utc::now() - Duration::hours(hours_ago));
    item.location = location;
    item
}

pub fn titles(items: &[ContentItem]) -> Vec<String> {
    items.iter().map(|i| i.title.clone()).collect()
}

/// Media element whose calls land in a shared map keyed by handle
#[derive(Default)]
pub struct ElementStates {
    pub playing: HashMap<ElementHandle, bool>,
    pub muted: HashMap<ElementHandle, bool>,
}

impl ElementStates {
    pub fn playing_count(&self) -> usize {
        self.playing.values().filter(|p| **p).count()
    }
}

pub struct FakeElement {
    pub handle: ElementHandle,
    pub states: Rc<RefCell<ElementStates>>,
}

impl MediaElement for FakeElement {
    fn set_muted(&mut self, muted: bool) {
        self.states.borrow_mut().muted.insert(self.handle, muted);
    }
    fn set_looped(&mut self, _: bool) {}
    fn set_inline(&mut self, _: bool) {}
    fn play(&mut self) -> Result<(), PlayRejected> {
        self.states.borrow_mut().playing.insert(self.handle, true);
        Ok(())
    }
    fn pause(&mut self) {
        self.states.borrow_mut().playing.insert(self.handle, false);
    }
    fn seek_to_start(&mut self) {}
}

/// Records which handles each created observer is watching
#[derive(Default)]
pub struct ObserverRegistry {
    pub thresholds: Vec<f64>,
    pub watching: Vec<(usize, ElementHandle)>,
}

pub struct FakeObserver {
    id: usize,
    registry: Rc<RefCell<ObserverRegistry>>,
}

impl VisibilityObserver for FakeObserver {
    fn observe(&mut self, handle: ElementHandle) {
        self.registry.borrow_mut().watching.push((self.id, handle));
    }
    fn unobserve(&mut self, handle: ElementHandle) {
        let id = self.id;
        self.registry
            .borrow_mut()
            .watching
            .retain(|(o, h)| !(*o == id && *h == handle));
    }
}

#[derive(Clone, Default)]
pub struct FakeObserverFactory {
    pub registry: Rc<RefCell<ObserverRegistry>>,
}

impl ObserverFactory for FakeObserverFactory {
    fn create(&self, threshold: f64) -> Box<dyn VisibilityObserver> {
        let mut registry = self.registry.borrow_mut();
        registry.thresholds.push(threshold);
        Box::new(FakeObserver {
            id: registry.thresholds.len() - 1,
            registry: self.registry.clone(),
        })
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<ViewEvent>>,
}

impl AnalyticsSink for RecordingSink {
    fn emit(&self, event: ViewEvent) {
        self.events.lock().push(event);
    }
}
