//! SMS delivery log entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mandilink_shared::events::NotificationType;

use super::enums::SmsStatus;

/// Audit record of one SMS send operation.
///
/// Created before the first attempt and updated in place across retries, so
/// exactly one row exists per operation. SENT/DELIVERED rows since local
/// midnight are what the daily quota counts.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SmsDeliveryLog {
    pub id: i64,
    pub farmer_id: String,
    pub phone_number: String,
    /// Notification type the message text was rendered from
    pub template_key: NotificationType,
    pub status: SmsStatus,
    /// Attempts made so far (1-based after the first try)
    pub retry_count: i32,
    /// Provider message id, set on success
    #[sqlx(default)]
    pub message_id: Option<String>,
    /// Last error seen, kept across retries for audit
    #[sqlx(default)]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new delivery log row
#[derive(Debug, Clone)]
pub struct NewSmsDeliveryLog {
    pub farmer_id: String,
    pub phone_number: String,
    pub template_key: NotificationType,
}
