//! Event dispatch.
//!
//! Idempotent ingestion of upstream marketplace events: the two-tier
//! recently-seen/durable dedup, the fixed event-to-handler table, and the
//! Kafka consume loop feeding it.

mod consumer;
mod dispatcher;
mod idempotency;

pub use consumer::EventConsumer;
pub use dispatcher::EventDispatcher;
pub use idempotency::{IdempotencyCache, InMemoryIdempotencyCache, RedisIdempotencyCache};
