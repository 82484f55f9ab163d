//! Analytics sink collaborator
//!
//! Delivery is fire-and-forget: `emit` never blocks and never fails from the
//! caller's point of view. Errors are logged and discarded, never retried.

use crate::config::AnalyticsConfig;
use crate::error::AnalyticsError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// Event type tag for a tile crossing the view threshold
pub const VIEW_EVENT_TYPE: &str = "view";
/// Entity type tag for feed items
pub const ITEM_ENTITY_TYPE: &str = "item";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewEvent {
    pub item_id: Uuid,
    /// `None` for anonymous viewers
    pub user_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub event_type: String,
    pub entity_type: String,
}

impl ViewEvent {
    pub fn viewed(item_id: Uuid, user_id: Option<Uuid>) -> Self {
        Self {
            item_id,
            user_id,
            event_type: VIEW_EVENT_TYPE.to_string(),
            entity_type: ITEM_ENTITY_TYPE.to_string(),
        }
    }
}

pub trait AnalyticsSink: Send + Sync {
    /// Hand off an event. Must return immediately.
    fn emit(&self, event: ViewEvent);
}

/// Posts events as JSON on a detached tokio task
#[derive(Clone)]
pub struct HttpAnalyticsSink {
    client: Client,
    endpoint: String,
}

impl HttpAnalyticsSink {
    pub fn new(config: &AnalyticsConfig) -> Result<Self, AnalyticsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Deliver one event and report the outcome
    pub async fn send(&self, event: &ViewEvent) -> Result<(), AnalyticsError> {
        let response = self.client.post(&self.endpoint).json(event).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalyticsError::Rejected(status.as_u16()));
        }

        debug!(item_id = %event.item_id, "View event delivered");
        Ok(())
    }

    fn spawn_send(&self, event: ViewEvent) -> Result<(), AnalyticsError> {
        let handle =
            tokio::runtime::Handle::try_current().map_err(|_| AnalyticsError::NoRuntime)?;
        let sink = self.clone();

        handle.spawn(async move {
            if let Err(e) = sink.send(&event).await {
                warn!(item_id = %event.item_id, error = %e, "Failed to deliver view event");
            }
        });
        Ok(())
    }
}

impl AnalyticsSink for HttpAnalyticsSink {
    fn emit(&self, event: ViewEvent) {
        let item_id = event.item_id;
        if let Err(e) = self.spawn_send(event) {
            warn!(item_id = %item_id, error = %e, "Dropping view event");
        }
    }
}
