//! Shared infrastructure for the MandiLink notification platform.
//!
//! Cross-cutting concerns used by the notification service: configuration
//! loading, the common error taxonomy, PostgreSQL pool management, the Redis
//! cache client, Kafka producer/consumer wrappers, retry policies and the
//! marketplace event model.

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod events;
pub mod kafka;
pub mod retry;

pub use cache::Cache;
pub use config::AppConfig;
pub use database::Database;
pub use error::{Result, SharedError};
