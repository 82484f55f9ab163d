//! Single-active-video playback coordination
//!
//! Per registered tile:
//! - Idle → Playing: visibility reaches full; every other registered element
//!   is stopped (pause + seek to start) before this one starts, muted, looped
//!   and inline
//! - Playing → PausedOffscreen: visibility drops below full; the element is
//!   paused and rewound (an Idle slot stays Idle)
//! - Playing / PausedOffscreen → Idle: another element activated
//!
//! At most one slot is `Playing` at any time. Every transition runs
//! synchronously inside one `on_visibility` call, so no caller can observe
//! two elements playing at once.

pub mod visibility;

pub use visibility::{
    ElementHandle, ObserverFactory, VisibilityEntry, VisibilityObserver,
};

use crate::config::PlaybackConfig;
use crate::error::PlayRejected;
use std::collections::HashMap;
use tracing::{debug, trace};
use uuid::Uuid;

/// Host video element
pub trait MediaElement {
    fn set_muted(&mut self, muted: bool);
    fn set_looped(&mut self, looped: bool);
    fn set_inline(&mut self, inline: bool);
    /// May be refused by the runtime's autoplay policy
    fn play(&mut self) -> Result<(), PlayRejected>;
    fn pause(&mut self);
    fn seek_to_start(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Idle,
    Playing,
    PausedOffscreen,
}

/// Touch or narrow viewports get scroll-driven autoplay for every tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEnvironment {
    Constrained,
    Unconstrained,
}

impl PlaybackEnvironment {
    pub fn detect(is_touch: bool, viewport_width: u32, breakpoint_px: u32) -> Self {
        if is_touch || viewport_width < breakpoint_px {
            PlaybackEnvironment::Constrained
        } else {
            PlaybackEnvironment::Unconstrained
        }
    }

    /// Detect using the configured mobile breakpoint
    pub fn from_config(is_touch: bool, viewport_width: u32, config: &PlaybackConfig) -> Self {
        Self::detect(is_touch, viewport_width, config.mobile_breakpoint_px)
    }
}

/// Who the tile was rendered for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileAudience {
    SignedIn,
    Anonymous,
}

enum Observation {
    /// Watched by the coordinator's shared observer
    Shared,
    /// Watched by an observer owned by this slot
    Local(Box<dyn VisibilityObserver>),
    /// Desktop primary grid: no scroll-driven autoplay
    Unobserved,
}

struct PlaybackSlot {
    item_id: Uuid,
    element: Box<dyn MediaElement>,
    state: SlotState,
    /// Registration order, used to order same-batch entries
    seq: u64,
    observation: Observation,
}

pub struct PlaybackCoordinator {
    environment: PlaybackEnvironment,
    activation_ratio: f64,
    factory: Box<dyn ObserverFactory>,
    shared_observer: Option<Box<dyn VisibilityObserver>>,
    slots: HashMap<ElementHandle, PlaybackSlot>,
    playing: Option<ElementHandle>,
    next_seq: u64,
}

impl PlaybackCoordinator {
    pub fn new(
        environment: PlaybackEnvironment,
        factory: Box<dyn ObserverFactory>,
        config: &PlaybackConfig,
    ) -> Self {
        Self {
            environment,
            activation_ratio: config.activation_ratio,
            factory,
            shared_observer: None,
            slots: HashMap::new(),
            playing: None,
            next_seq: 0,
        }
    }

    pub fn environment(&self) -> PlaybackEnvironment {
        self.environment
    }

    /// Tile mounted. Re-registering a live handle replaces its slot.
    pub fn register(
        &mut self,
        handle: ElementHandle,
        item_id: Uuid,
        element: Box<dyn MediaElement>,
        audience: TileAudience,
    ) {
        if self.slots.contains_key(&handle) {
            self.unregister(handle);
        }

        let observation = match (self.environment, audience) {
            (PlaybackEnvironment::Constrained, _) => {
                let ratio = self.activation_ratio;
                let factory = &self.factory;
                self.shared_observer
                    .get_or_insert_with(|| factory.create(ratio))
                    .observe(handle);
                Observation::Shared
            }
            (PlaybackEnvironment::Unconstrained, TileAudience::Anonymous) => {
                let mut local = self.factory.create(self.activation_ratio);
                local.observe(handle);
                Observation::Local(local)
            }
            (PlaybackEnvironment::Unconstrained, TileAudience::SignedIn) => {
                Observation::Unobserved
            }
        };

        let seq = self.next_seq;
        self.next_seq += 1;

        debug!(%handle, %item_id, seq, "Playback slot registered");
        self.slots.insert(
            handle,
            PlaybackSlot {
                item_id,
                element,
                state: SlotState::Idle,
                seq,
                observation,
            },
        );
    }

    /// Tile unmounted. Returns false for unknown handles. Never promotes
    /// another element to playing.
    pub fn unregister(&mut self, handle: ElementHandle) -> bool {
        let Some(mut slot) = self.slots.remove(&handle) else {
            return false;
        };

        match &mut slot.observation {
            Observation::Shared => {
                if let Some(shared) = self.shared_observer.as_mut() {
                    shared.unobserve(handle);
                }
            }
            Observation::Local(local) => local.unobserve(handle),
            Observation::Unobserved => {}
        }

        if self.playing == Some(handle) {
            slot.element.pause();
            self.playing = None;
        }

        debug!(%handle, item_id = %slot.item_id, "Playback slot unregistered");
        true
    }

    /// Apply a batch of visibility changes. Entries are processed in
    /// registration order so the last full-visibility transition wins.
    pub fn on_visibility(&mut self, entries: &[VisibilityEntry]) {
        let mut ordered: Vec<(u64, VisibilityEntry)> = entries
            .iter()
            .filter_map(|entry| match self.slots.get(&entry.handle) {
                Some(slot) if !matches!(slot.observation, Observation::Unobserved) => {
                    Some((slot.seq, *entry))
                }
                Some(_) => {
                    trace!(handle = %entry.handle, "Ignoring entry for unobserved slot");
                    None
                }
                None => {
                    trace!(handle = %entry.handle, "Ignoring entry for unknown slot");
                    None
                }
            })
            .collect();
        ordered.sort_by_key(|(seq, _)| *seq);

        for (_, entry) in ordered {
            let ratio = entry.clamped_ratio();
            if visibility::reaches(ratio, self.activation_ratio) {
                self.activate(entry.handle);
            } else {
                self.deactivate(entry.handle);
            }
        }
    }

    /// Explicit user gesture on a tile whose autoplay was refused
    pub fn play_on_gesture(&mut self, handle: ElementHandle) -> bool {
        if !self.slots.contains_key(&handle) {
            return false;
        }
        self.activate(handle);
        self.playing == Some(handle)
    }

    pub fn playing(&self) -> Option<ElementHandle> {
        self.playing
    }

    pub fn state(&self, handle: ElementHandle) -> Option<SlotState> {
        self.slots.get(&handle).map(|slot| slot.state)
    }

    /// Always 0 or 1
    pub fn playing_count(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| slot.state == SlotState::Playing)
            .count()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Stop everything else, then start `handle` muted
    fn activate(&mut self, handle: ElementHandle) {
        if self.playing == Some(handle) {
            return;
        }

        for (other, slot) in self.slots.iter_mut() {
            if *other == handle {
                continue;
            }
            slot.element.pause();
            slot.element.seek_to_start();
            slot.state = SlotState::Idle;
        }
        self.playing = None;

        let Some(slot) = self.slots.get_mut(&handle) else {
            return;
        };

        slot.element.set_muted(true);
        slot.element.set_looped(true);
        slot.element.set_inline(true);

        match slot.element.play() {
            Ok(()) => {
                slot.state = SlotState::Playing;
                self.playing = Some(handle);
                debug!(%handle, item_id = %slot.item_id, "Playback started");
            }
            Err(e) => {
                // Autoplay refused: wait for a user gesture
                slot.state = SlotState::Idle;
                debug!(%handle, error = %e, "Autoplay rejected");
            }
        }
    }

    fn deactivate(&mut self, handle: ElementHandle) {
        let Some(slot) = self.slots.get_mut(&handle) else {
            return;
        };

        slot.element.pause();
        slot.element.seek_to_start();
        if slot.state == SlotState::Playing {
            slot.state = SlotState::PausedOffscreen;
        }

        if self.playing == Some(handle) {
            self.playing = None;
            debug!(%handle, "Playback paused offscreen");
        }
    }
}
