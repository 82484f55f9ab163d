//! Device-position collaborator

use crate::error::PositionError;
use crate::models::Coord;
use async_trait::async_trait;
use std::time::Duration;

/// Single-shot position request options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// Zero forbids cached readings
    pub maximum_age: Duration,
}

impl PositionOptions {
    /// High accuracy, no cached reading, bounded by `timeout`
    pub fn single_shot(timeout: Duration) -> Self {
        Self {
            enable_high_accuracy: true,
            timeout,
            maximum_age: Duration::ZERO,
        }
    }
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self::single_shot(Duration::from_secs(30))
    }
}

/// Host capability that reads the device's current position
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DevicePositionProvider: Send + Sync {
    async fn current_position(&self, options: PositionOptions) -> Result<Coord, PositionError>;
}
