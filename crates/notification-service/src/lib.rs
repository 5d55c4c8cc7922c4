//! Farmer notification engine.
//!
//! Routes marketplace events to farmers over SMS, push and the in-app inbox,
//! with per-farmer preferences, quiet hours, SMS quota enforcement with
//! retry/backoff, idempotent event ingestion and multi-language templates.
//!
//! ## Core flow
//!
//! upstream event → dispatcher (idempotency check) → router (criticality +
//! preference decision) → template engine + delivery channels → in-app store
//! → aggregated result.
//!
//! ## Module structure
//!
//! - `models`: domain entities and enums
//! - `error`: error types
//! - `repository`: database access layer
//! - `template`: localized message templates
//! - `preference`: per-farmer decision logic and quiet hours
//! - `channels`: SMS and push delivery on provider capability traits
//! - `routing`: the notification router
//! - `dispatch`: idempotent event ingestion and the Kafka consumer
//! - `service`: preference/device/inbox user-facing services
//! - `retention`: periodic cleanup of expired data

pub mod channels;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod preference;
pub mod repository;
pub mod retention;
pub mod routing;
pub mod service;
pub mod template;

pub use channels::{
    PushChannel, PushOutcome, PushProvider, SmsChannel, SmsOutcome, SmsProvider, StubPushProvider,
    StubSmsProvider,
};
pub use dispatch::{EventConsumer, EventDispatcher, InMemoryIdempotencyCache, RedisIdempotencyCache};
pub use error::{NotifyError, Result};
pub use models::*;
pub use preference::{ChannelPermissions, PreferenceEvaluator};
pub use repository::{
    DeviceTokenRepository, InAppRepository, PreferencesRepository, SmsLogRepository,
};
pub use retention::RetentionJob;
pub use routing::{NotificationResult, NotificationRouter, SendNotificationParams};
pub use service::{DeviceTokenService, InboxService, PreferenceService, UpdatePreferencesRequest};
pub use template::TemplateEngine;
