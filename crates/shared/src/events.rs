//! Marketplace event and notification model.
//!
//! Defines the envelope for inbound marketplace events, the notification
//! type/category taxonomy the routing engine works with, and the supported
//! farmer languages. Events arrive at-least-once; the `event_id` carried in
//! the envelope is the idempotency key the dispatcher dedups on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MarketEventType
// ---------------------------------------------------------------------------

/// Business events produced by the marketplace.
///
/// Unrecognized wire values deserialize to `Unknown` so a producer rolling
/// out a new event type cannot crash the consumer loop; the dispatcher
/// rejects `Unknown` explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketEventType {
    OrderMatched,
    PaymentReceived,
    MatchExpiring,
    OrderCancelled,
    HaulerEnRoute,
    PickupComplete,
    OrderDelivered,
    DropPointAssigned,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for MarketEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // matches the serde SCREAMING_SNAKE_CASE representation so logs and
        // wire payloads agree
        let s = match self {
            Self::OrderMatched => "ORDER_MATCHED",
            Self::PaymentReceived => "PAYMENT_RECEIVED",
            Self::MatchExpiring => "MATCH_EXPIRING",
            Self::OrderCancelled => "ORDER_CANCELLED",
            Self::HaulerEnRoute => "HAULER_EN_ROUTE",
            Self::PickupComplete => "PICKUP_COMPLETE",
            Self::OrderDelivered => "ORDER_DELIVERED",
            Self::DropPointAssigned => "DROP_POINT_ASSIGNED",
            Self::Unknown => "UNKNOWN",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// EventEnvelope
// ---------------------------------------------------------------------------

/// Envelope for every inbound marketplace event.
///
/// - `event_id` is unique per business occurrence and is the idempotency key
/// - `data` carries the type-specific fields as JSON, so one envelope shape
///   covers all event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    /// Unique event identifier (idempotency key)
    pub event_id: String,
    /// Event type
    pub event_type: MarketEventType,
    /// Target farmer
    pub farmer_id: String,
    /// When the business event occurred
    pub occurred_at: DateTime<Utc>,
    /// Type-specific payload fields
    pub data: serde_json::Value,
}

// ---------------------------------------------------------------------------
// NotificationType
// ---------------------------------------------------------------------------

/// Notification types the routing engine can deliver.
///
/// A superset of the marketplace event types: quality disputes are raised by
/// a separate moderation flow, and crop advisories come from the agronomy
/// content pipeline, but both are delivered through the same engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    OrderMatched,
    PaymentReceived,
    MatchExpiring,
    OrderCancelled,
    QualityDispute,
    HaulerEnRoute,
    PickupComplete,
    OrderDelivered,
    DropPointAssigned,
    CropAdvisory,
}

impl NotificationType {
    /// Whether this type is critical: timely action is required, so it is
    /// sent over SMS as well as push and bypasses quiet hours.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            Self::OrderMatched
                | Self::PaymentReceived
                | Self::MatchExpiring
                | Self::OrderCancelled
                | Self::QualityDispute
        )
    }

    /// Category the per-farmer toggles are keyed on
    pub fn category(&self) -> NotificationCategory {
        match self {
            Self::OrderMatched
            | Self::MatchExpiring
            | Self::OrderCancelled
            | Self::QualityDispute
            | Self::HaulerEnRoute
            | Self::PickupComplete
            | Self::OrderDelivered
            | Self::DropPointAssigned => NotificationCategory::OrderUpdates,
            Self::PaymentReceived => NotificationCategory::PaymentAlerts,
            Self::CropAdvisory => NotificationCategory::Educational,
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::OrderMatched => "ORDER_MATCHED",
            Self::PaymentReceived => "PAYMENT_RECEIVED",
            Self::MatchExpiring => "MATCH_EXPIRING",
            Self::OrderCancelled => "ORDER_CANCELLED",
            Self::QualityDispute => "QUALITY_DISPUTE",
            Self::HaulerEnRoute => "HAULER_EN_ROUTE",
            Self::PickupComplete => "PICKUP_COMPLETE",
            Self::OrderDelivered => "ORDER_DELIVERED",
            Self::DropPointAssigned => "DROP_POINT_ASSIGNED",
            Self::CropAdvisory => "CROP_ADVISORY",
        };
        write!(f, "{s}")
    }
}

/// Notification category for preference gating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationCategory {
    OrderUpdates,
    PaymentAlerts,
    Educational,
}

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// Languages the template catalog can render
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Language {
    #[default]
    English,
    Kannada,
    Hindi,
    Tamil,
    Telugu,
}

impl Language {
    /// Parse a language code the way client apps report it.
    ///
    /// Lower-cases, takes the first two characters and maps known prefixes;
    /// anything else falls back to English. Total: never fails.
    pub fn from_code(code: &str) -> Self {
        let lowered = code.to_lowercase();
        let prefix: String = lowered.chars().take(2).collect();
        match prefix.as_str() {
            "kn" | "ka" => Self::Kannada,
            "hi" => Self::Hindi,
            "ta" => Self::Tamil,
            "te" => Self::Telugu,
            _ => Self::English,
        }
    }
}
