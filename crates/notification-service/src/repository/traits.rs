//! Repository trait definitions.
//!
//! Services depend on these abstractions rather than the concrete sqlx
//! implementations, which keeps the routing logic testable with mocks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{
    DeviceToken, DeviceType, FarmerPreferences, InAppNotification, NewInAppNotification,
    NewSmsDeliveryLog, SmsDeliveryLog,
};

/// Farmer preferences repository interface
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PreferencesRepositoryTrait: Send + Sync {
    /// Fetch a farmer's preferences, if any exist
    async fn get(&self, farmer_id: &str) -> Result<Option<FarmerPreferences>>;

    /// Insert the default preference row for a farmer.
    ///
    /// Concurrent first reads may race; implementations resolve the conflict
    /// by returning the row that won (insert ... on conflict do nothing,
    /// then select).
    async fn create_defaults(&self, farmer_id: &str) -> Result<FarmerPreferences>;

    /// Persist a full preference row
    async fn save(&self, prefs: &FarmerPreferences) -> Result<FarmerPreferences>;
}

/// Device token repository interface
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceTokenRepositoryTrait: Send + Sync {
    /// Register or refresh a token, keyed by (farmer_id, token).
    /// Re-registration reactivates a previously deactivated token.
    async fn upsert(
        &self,
        farmer_id: &str,
        token: &str,
        device_type: DeviceType,
    ) -> Result<DeviceToken>;

    /// All active tokens for a farmer
    async fn list_active(&self, farmer_id: &str) -> Result<Vec<DeviceToken>>;

    /// Deactivate one token on explicit unregister; true if a row changed
    async fn deactivate(&self, farmer_id: &str, token: &str) -> Result<bool>;

    /// Deactivate tokens the push provider reported as invalid
    async fn deactivate_by_tokens(&self, tokens: &[String]) -> Result<u64>;

    /// Hard-delete inactive tokens not touched since the cutoff (retention)
    async fn delete_inactive_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}

/// In-app notification repository interface
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InAppRepositoryTrait: Send + Sync {
    /// Store a new notification
    async fn create(&self, new: &NewInAppNotification) -> Result<InAppNotification>;

    /// Durable idempotency lookup: the row whose metadata references the
    /// given event id, if one exists
    async fn find_by_event_id(&self, event_id: &str) -> Result<Option<InAppNotification>>;

    /// List a farmer's notifications, newest first
    async fn list(
        &self,
        farmer_id: &str,
        limit: i64,
        offset: i64,
        unread_only: bool,
    ) -> Result<Vec<InAppNotification>>;

    /// Count of unread notifications
    async fn unread_count(&self, farmer_id: &str) -> Result<i64>;

    /// Mark one notification read; true if a row changed
    async fn mark_read(&self, farmer_id: &str, id: i64) -> Result<bool>;

    /// Mark all of a farmer's notifications read; returns rows changed
    async fn mark_all_read(&self, farmer_id: &str) -> Result<u64>;

    /// Delete one notification owned by the farmer; true if a row changed
    async fn delete(&self, farmer_id: &str, id: i64) -> Result<bool>;

    /// Retention: delete read notifications created before the cutoff
    async fn delete_read_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}

/// SMS delivery log repository interface
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SmsLogRepositoryTrait: Send + Sync {
    /// Create the PENDING row for a send operation, before the first attempt
    async fn create(&self, new: &NewSmsDeliveryLog) -> Result<SmsDeliveryLog>;

    /// Record a failed attempt: bump the retry count, keep the last error
    async fn record_attempt(&self, id: i64, retry_count: i32, error: &str) -> Result<()>;

    /// Final success: status SENT with the provider message id
    async fn mark_sent(&self, id: i64, retry_count: i32, message_id: &str) -> Result<()>;

    /// Final failure after exhausting attempts: status FAILED
    async fn mark_failed(&self, id: i64, retry_count: i32, error: &str) -> Result<()>;

    /// Quota accounting: SENT/DELIVERED rows for the farmer since the cutoff
    async fn count_sent_since(&self, farmer_id: &str, since: DateTime<Utc>) -> Result<i64>;
}
