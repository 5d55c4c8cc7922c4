//! Farmer notification preferences.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::NotificationLevel;

/// Per-farmer notification settings.
///
/// One row per farmer, lazily created with defaults on first read and never
/// deleted. Quiet hours are stored as local wall-clock HH:MM strings; the
/// window may wrap midnight (start > end).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FarmerPreferences {
    pub id: i64,
    /// Farmer ID (unique, 1:1)
    pub farmer_id: String,
    /// Allow SMS delivery at all
    pub sms_enabled: bool,
    /// Allow push delivery at all
    pub push_enabled: bool,
    /// Whether the quiet-hours window is honored
    pub quiet_hours_enabled: bool,
    /// Window start, local wall clock "HH:MM"
    pub quiet_hours_start: String,
    /// Window end, local wall clock "HH:MM"
    pub quiet_hours_end: String,
    /// Coarse level filter
    pub notification_level: NotificationLevel,
    /// Category toggle: order lifecycle updates
    pub order_updates: bool,
    /// Category toggle: payment alerts
    pub payment_alerts: bool,
    /// Category toggle: crop advisories and other educational content
    pub educational_content: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FarmerPreferences {
    /// Default settings applied when a farmer is seen for the first time:
    /// both channels on, quiet hours 22:00-06:00 enabled, level ALL, every
    /// category on.
    pub fn defaults_for(farmer_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            farmer_id: farmer_id.into(),
            sms_enabled: true,
            push_enabled: true,
            quiet_hours_enabled: true,
            quiet_hours_start: "22:00".to_string(),
            quiet_hours_end: "06:00".to_string(),
            notification_level: NotificationLevel::All,
            order_updates: true,
            payment_alerts: true,
            educational_content: true,
            created_at: now,
            updated_at: now,
        }
    }
}
