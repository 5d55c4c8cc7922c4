//! Recently-seen event cache.
//!
//! The low-latency first tier of the dispatcher's dedup. The durable store
//! (in-app notifications keyed by event id) remains the source of truth;
//! this layer only exists so the hot path can reject recent duplicates
//! without a database round trip.

use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::warn;

use mandilink_shared::cache::Cache;

/// Recently-seen event set
#[async_trait]
pub trait IdempotencyCache: Send + Sync {
    /// Atomically record the event id; true when it was not seen before.
    ///
    /// Check and mark are one operation so two concurrent deliveries of the
    /// same event cannot both observe "fresh".
    async fn check_and_mark(&self, event_id: &str) -> bool;

    /// Remove a mark after failed processing, so redelivery can retry
    async fn forget(&self, event_id: &str);
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

struct SeenSet {
    set: HashSet<String>,
    order: VecDeque<String>,
}

/// Bounded in-process recently-seen set.
///
/// Insertion order eviction: once the capacity is exceeded the oldest entry
/// is dropped. Eviction only widens the race window back to the durable
/// check, it never causes duplicate side effects.
pub struct InMemoryIdempotencyCache {
    inner: Mutex<SeenSet>,
    capacity: usize,
}

impl InMemoryIdempotencyCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(SeenSet {
                set: HashSet::new(),
                order: VecDeque::new(),
            }),
            capacity: capacity.max(1),
        }
    }

    /// Current number of tracked event ids
    pub fn len(&self) -> usize {
        self.inner.lock().set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl IdempotencyCache for InMemoryIdempotencyCache {
    async fn check_and_mark(&self, event_id: &str) -> bool {
        let mut guard = self.inner.lock();

        if !guard.set.insert(event_id.to_string()) {
            return false;
        }
        guard.order.push_back(event_id.to_string());

        if guard.set.len() > self.capacity
            && let Some(oldest) = guard.order.pop_front()
        {
            guard.set.remove(&oldest);
        }

        true
    }

    async fn forget(&self, event_id: &str) {
        let mut guard = self.inner.lock();
        guard.set.remove(event_id);
        guard.order.retain(|id| id != event_id);
    }
}

// ---------------------------------------------------------------------------
// Redis implementation
// ---------------------------------------------------------------------------

/// Redis-backed recently-seen set for multi-process deployments.
///
/// SET NX EX gives the same atomic check-and-mark across processes. Fails
/// open: if Redis is unreachable the event is treated as fresh and the
/// durable check catches actual duplicates.
pub struct RedisIdempotencyCache {
    cache: Cache,
    ttl: Duration,
}

impl RedisIdempotencyCache {
    pub fn new(cache: Cache, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    fn key(event_id: &str) -> String {
        format!("notify:event_seen:{event_id}")
    }
}

#[async_trait]
impl IdempotencyCache for RedisIdempotencyCache {
    async fn check_and_mark(&self, event_id: &str) -> bool {
        match self.cache.set_nx(&Self::key(event_id), &true, self.ttl).await {
            Ok(fresh) => fresh,
            Err(e) => {
                warn!(error = %e, event_id, "idempotency cache unavailable, failing open");
                true
            }
        }
    }

    async fn forget(&self, event_id: &str) {
        if let Err(e) = self.cache.delete(&Self::key(event_id)).await {
            warn!(error = %e, event_id, "failed to forget idempotency key");
        }
    }
}
