//! Host-agnostic viewport visibility
//!
//! The host owns the real intersection machinery. It creates observers on
//! request, and delivers `VisibilityEntry` batches back to whoever asked for
//! them (the coordinator or a view tracker).

use serde::{Deserialize, Serialize};

/// Opaque handle naming one mounted element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementHandle(pub u64);

impl std::fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "el-{}", self.0)
    }
}

/// One visibility change: fraction of the element's box inside the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityEntry {
    pub handle: ElementHandle,
    pub ratio: f64,
}

impl VisibilityEntry {
    pub fn new(handle: ElementHandle, ratio: f64) -> Self {
        Self { handle, ratio }
    }

    /// Ratio clamped to [0, 1]; NaN reads as not visible
    pub fn clamped_ratio(&self) -> f64 {
        if self.ratio.is_nan() {
            0.0
        } else {
            self.ratio.clamp(0.0, 1.0)
        }
    }
}

pub trait VisibilityObserver {
    fn observe(&mut self, handle: ElementHandle);
    fn unobserve(&mut self, handle: ElementHandle);
}

/// Creates observers that report crossings of `threshold`
pub trait ObserverFactory {
    fn create(&self, threshold: f64) -> Box<dyn VisibilityObserver>;
}

/// Ratios this close to 1.0 count as fully visible
pub const FULL_VISIBILITY_EPSILON: f64 = 1e-3;

pub fn reaches(ratio: f64, threshold: f64) -> bool {
    if threshold >= 1.0 {
        ratio >= 1.0 - FULL_VISIBILITY_EPSILON
    } else {
        ratio >= threshold
    }
}
