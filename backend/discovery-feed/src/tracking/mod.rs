//! Once-per-mount "viewed" events
//!
//! A `ViewTracker` lives exactly as long as one tile mount. It arms a
//! visibility observation at the view threshold, reports the first crossing,
//! then disarms for good. When the host has no visibility observation at all,
//! the event is reported at mount instead.

use crate::clients::{AnalyticsSink, ViewEvent};
use crate::config::TrackingConfig;
use crate::playback::visibility::{self, ElementHandle, ObserverFactory, VisibilityEntry, VisibilityObserver};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

pub struct ViewTracker {
    item_id: Uuid,
    viewer_id: Option<Uuid>,
    handle: ElementHandle,
    threshold: f64,
    /// Present only while armed
    observer: Option<Box<dyn VisibilityObserver>>,
    reported: bool,
    sink: Arc<dyn AnalyticsSink>,
}

impl ViewTracker {
    /// Mount-time entry point. `observers` is `None` when the host cannot
    /// observe visibility.
    pub fn track_once(
        item_id: Uuid,
        viewer_id: Option<Uuid>,
        handle: ElementHandle,
        observers: Option<&dyn ObserverFactory>,
        sink: Arc<dyn AnalyticsSink>,
        config: &TrackingConfig,
    ) -> Self {
        let mut tracker = Self {
            item_id,
            viewer_id,
            handle,
            threshold: config.view_threshold,
            observer: None,
            reported: false,
            sink,
        };

        match observers {
            Some(factory) => {
                let mut observer = factory.create(tracker.threshold);
                observer.observe(handle);
                tracker.observer = Some(observer);
            }
            None => {
                debug!(%item_id, "Visibility observation unavailable, reporting view at mount");
                tracker.report();
            }
        }

        tracker
    }

    /// Feed visibility changes; entries for other elements are ignored
    pub fn on_visibility(&mut self, entries: &[VisibilityEntry]) {
        if self.reported {
            return;
        }

        let crossed = entries
            .iter()
            .filter(|entry| entry.handle == self.handle)
            .any(|entry| visibility::reaches(entry.clamped_ratio(), self.threshold));

        if crossed {
            self.report();
        }
    }

    pub fn is_reported(&self) -> bool {
        self.reported
    }

    pub fn is_armed(&self) -> bool {
        self.observer.is_some()
    }

    pub fn item_id(&self) -> Uuid {
        self.item_id
    }

    fn report(&mut self) {
        self.disarm();
        if self.reported {
            return;
        }
        self.reported = true;

        debug!(item_id = %self.item_id, anonymous = self.viewer_id.is_none(), "Item viewed");
        self.sink.emit(ViewEvent::viewed(self.item_id, self.viewer_id));
    }

    fn disarm(&mut self) {
        if let Some(mut observer) = self.observer.take() {
            observer.unobserve(self.handle);
        }
    }
}

impl Drop for ViewTracker {
    fn drop(&mut self) {
        self.disarm();
    }
}
