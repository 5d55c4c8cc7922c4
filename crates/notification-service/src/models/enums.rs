//! Enum types for the notification domain.
//!
//! All enums support both database (sqlx) and JSON (serde) serialization.

use serde::{Deserialize, Serialize};

/// Per-farmer notification level.
///
/// Coarse filter applied before any per-category toggle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationLevel {
    /// Receive everything the category toggles allow
    #[default]
    All,
    /// Only critical notifications
    Critical,
    /// Nothing at all
    Mute,
}

/// Delivery status of one SMS send operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SmsStatus {
    /// Log row created, no attempt has succeeded yet
    #[default]
    Pending,
    /// Accepted by the provider
    Sent,
    /// Delivery receipt received from the provider
    Delivered,
    /// All attempts exhausted
    Failed,
}

impl SmsStatus {
    /// Statuses that count against the daily quota
    pub fn counts_toward_quota(&self) -> bool {
        matches!(self, Self::Sent | Self::Delivered)
    }
}

/// Device platform of a registered push token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum DeviceType {
    #[default]
    Android,
    Ios,
}
