//! Shared error taxonomy.
//!
//! Infrastructure-level errors common to all modules, using thiserror for
//! readable error messages. Domain-specific errors live in the service crate
//! and wrap this type where infrastructure faults bubble up.

use thiserror::Error;

/// Infrastructure error type
#[derive(Debug, Error)]
pub enum SharedError {
    // ==================== Database ====================
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("record not found: {entity} id={id}")]
    NotFound { entity: String, id: String },

    // ==================== Cache ====================
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    // ==================== Kafka ====================
    #[error("kafka error: {0}")]
    Kafka(String),

    // ==================== Configuration ====================
    #[error("configuration error: {0}")]
    Config(String),

    // ==================== Validation ====================
    #[error("validation failed: {0}")]
    Validation(String),

    // ==================== External services ====================
    #[error("external service error: {service} - {message}")]
    ExternalService { service: String, message: String },

    #[error("external service timeout: {service}")]
    ExternalServiceTimeout { service: String },

    // ==================== Generic ====================
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias for infrastructure operations
pub type Result<T> = std::result::Result<T, SharedError>;

impl SharedError {
    /// Stable error code for logs and structured results
    pub fn code(&self) -> &'static str {
        match self {
            Self::Database(_) => "DATABASE_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Redis(_) => "REDIS_ERROR",
            Self::Kafka(_) => "KAFKA_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::ExternalService { .. } => "EXTERNAL_SERVICE_ERROR",
            Self::ExternalServiceTimeout { .. } => "EXTERNAL_SERVICE_TIMEOUT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the error is a transient infrastructure fault worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Database(_)
                | Self::Redis(_)
                | Self::Kafka(_)
                | Self::ExternalServiceTimeout { .. }
        )
    }
}
