//! Notification service error types.
//!
//! Domain and system errors for the routing engine. Expected delivery
//! outcomes (quota exceeded at the caller-visible level, quiet-hours skips,
//! empty token sets) are represented in result structs, not here; these
//! variants cover the genuinely unexpected cases plus the internal signals
//! the channels use to decide retry behavior.

use thiserror::Error;

/// Notification service error type
#[derive(Debug, Error)]
pub enum NotifyError {
    // === Delivery errors ===
    #[error("daily SMS quota exceeded: farmer_id={farmer_id}, limit={limit}")]
    QuotaExceeded { farmer_id: String, limit: i64 },

    #[error("provider send failed: channel={channel}, reason={reason}")]
    ProviderFailure { channel: String, reason: String },

    // === Inbox errors ===
    #[error("notification not found: id={0}")]
    NotificationNotFound(i64),

    // === System errors ===
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Shared(#[from] mandilink_shared::error::SharedError),
}

/// Result alias for the notification service
pub type Result<T> = std::result::Result<T, NotifyError>;

impl NotifyError {
    /// Whether the error is a transient fault worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Database(_) | Self::ProviderFailure { .. } => true,
            Self::Shared(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Stable error code for structured results and logs
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::QuotaExceeded { .. } => "QUOTA_EXCEEDED",
            Self::ProviderFailure { .. } => "PROVIDER_FAILURE",
            Self::NotificationNotFound(_) => "NOTIFICATION_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Shared(_) => "SHARED_ERROR",
        }
    }
}
