//! Device token registry entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::DeviceType;

/// A push token registered by one of a farmer's devices.
///
/// A farmer may hold many tokens (multi-device). Tokens are upserted on
/// registration keyed by (farmer_id, token), deactivated on unregister or on
/// provider-reported invalidity, and hard-deleted only by retention.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DeviceToken {
    pub id: i64,
    pub farmer_id: String,
    /// Provider-issued push token
    pub token: String,
    pub device_type: DeviceType,
    /// False after unregister or provider invalidation
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
