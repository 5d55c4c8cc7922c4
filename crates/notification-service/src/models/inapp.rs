//! In-app notification entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mandilink_shared::events::NotificationType;

/// Metadata key carrying the originating event id.
///
/// The dispatcher's durable idempotency check looks rows up by this key, so
/// it must match what the router writes.
pub const METADATA_EVENT_ID: &str = "eventId";

/// A notification stored for the farmer's in-app inbox.
///
/// Created by the router independently of SMS/push outcomes; the in-app
/// record is its own durability guarantee. Read-state transitions mutate it;
/// deletion happens on explicit user action or via retention (read rows
/// only).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InAppNotification {
    pub id: i64,
    pub farmer_id: String,
    pub notification_type: NotificationType,
    pub title: String,
    pub body: String,
    #[sqlx(default)]
    pub deeplink: Option<String>,
    /// Opaque key-value payload; carries the event id when dispatched from
    /// a marketplace event
    pub metadata: serde_json::Value,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl InAppNotification {
    /// Event id recorded in metadata, if this row came from a dispatched event
    pub fn event_id(&self) -> Option<&str> {
        self.metadata.get(METADATA_EVENT_ID).and_then(|v| v.as_str())
    }
}

/// Insert payload for a new in-app notification
#[derive(Debug, Clone)]
pub struct NewInAppNotification {
    pub farmer_id: String,
    pub notification_type: NotificationType,
    pub title: String,
    pub body: String,
    pub deeplink: Option<String>,
    pub metadata: serde_json::Value,
}
