//! Event dispatcher.
//!
//! Idempotent entry point for upstream marketplace events. Dedup is two
//! tiers: the in-memory recently-seen set rejects hot duplicates without a
//! database round trip, and the durable lookup (an in-app notification whose
//! metadata references the event id) catches duplicates across restarts.
//! The at-least-once event source makes both necessary.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use mandilink_shared::events::{EventEnvelope, MarketEventType, NotificationType};

use crate::error::Result;
use crate::models::METADATA_EVENT_ID;
use crate::repository::InAppRepositoryTrait;
use crate::routing::{NotificationRouter, SendNotificationParams};

use super::idempotency::IdempotencyCache;

/// Event dispatcher
pub struct EventDispatcher {
    router: Arc<NotificationRouter>,
    inapp_repo: Arc<dyn InAppRepositoryTrait>,
    seen_cache: Arc<dyn IdempotencyCache>,
}

impl EventDispatcher {
    pub fn new(
        router: Arc<NotificationRouter>,
        inapp_repo: Arc<dyn InAppRepositoryTrait>,
        seen_cache: Arc<dyn IdempotencyCache>,
    ) -> Self {
        Self {
            router,
            inapp_repo,
            seen_cache,
        }
    }

    /// Process one event; returns true when a notification was routed.
    ///
    /// Duplicates and unknown types return false without side effects. When
    /// routing fails outright the in-memory mark is released so the source's
    /// redelivery gets another chance; a routing success is marked durable
    /// implicitly by the created in-app record.
    #[instrument(
        skip(self, envelope),
        fields(
            event_id = %envelope.event_id,
            event_type = %envelope.event_type,
            farmer_id = %envelope.farmer_id,
        )
    )]
    pub async fn dispatch(&self, envelope: &EventEnvelope) -> Result<bool> {
        if !self.seen_cache.check_and_mark(&envelope.event_id).await {
            debug!("duplicate event rejected by recently-seen cache");
            return Ok(false);
        }

        match self.inapp_repo.find_by_event_id(&envelope.event_id).await {
            Ok(Some(existing)) => {
                debug!(
                    in_app_id = existing.id,
                    "duplicate event rejected by durable lookup"
                );
                return Ok(false);
            }
            Ok(None) => {}
            Err(e) => {
                // cannot prove the event unprocessed; release the mark and
                // let redelivery retry
                self.seen_cache.forget(&envelope.event_id).await;
                return Err(e);
            }
        }

        let Some(params) = build_params(envelope) else {
            warn!("unknown event type, rejecting");
            self.seen_cache.forget(&envelope.event_id).await;
            return Ok(false);
        };

        let result = self.router.send_notification(params).await;

        if !result.success {
            self.seen_cache.forget(&envelope.event_id).await;
        }

        info!(success = result.success, "event dispatched");
        Ok(result.success)
    }
}

// ---------------------------------------------------------------------------
// Event handlers
// ---------------------------------------------------------------------------

/// Fixed event-to-notification table.
///
/// Each arm extracts the payload fields its templates need and builds the
/// router call; `None` marks an unroutable (unknown) event type.
fn build_params(envelope: &EventEnvelope) -> Option<SendNotificationParams> {
    let notification_type = match envelope.event_type {
        MarketEventType::OrderMatched => NotificationType::OrderMatched,
        MarketEventType::PaymentReceived => NotificationType::PaymentReceived,
        MarketEventType::MatchExpiring => NotificationType::MatchExpiring,
        MarketEventType::OrderCancelled => NotificationType::OrderCancelled,
        MarketEventType::HaulerEnRoute => NotificationType::HaulerEnRoute,
        MarketEventType::PickupComplete => NotificationType::PickupComplete,
        MarketEventType::OrderDelivered => NotificationType::OrderDelivered,
        MarketEventType::DropPointAssigned => NotificationType::DropPointAssigned,
        MarketEventType::Unknown => return None,
    };

    let data = &envelope.data;
    let order_id = extract_str(data, "orderId", "");

    let mut params = SendNotificationParams::new(&envelope.farmer_id, notification_type)
        .with_language(mandilink_shared::events::Language::from_code(&extract_str(
            data, "language", "en",
        )))
        .with_metadata(METADATA_EVENT_ID, serde_json::json!(envelope.event_id))
        .with_metadata("eventType", serde_json::json!(envelope.event_type.to_string()));

    let phone = extract_str(data, "phone", "");
    if !phone.is_empty() {
        params = params.with_phone(phone);
    }
    if !order_id.is_empty() {
        params = params
            .with_deeplink(format!("/orders/{order_id}"))
            .with_metadata("orderId", serde_json::json!(order_id))
            .with_variable("order_id", &order_id);
    }

    params = match envelope.event_type {
        MarketEventType::OrderMatched => params
            .with_variable("crop", extract_str(data, "crop", ""))
            .with_variable("quantity", extract_str(data, "quantity", ""))
            .with_variable("price", extract_str(data, "price", ""))
            .with_variable("total", extract_str(data, "total", "")),
        MarketEventType::PaymentReceived => {
            params.with_variable("amount", extract_str(data, "amount", ""))
        }
        MarketEventType::MatchExpiring => params
            .with_variable("crop", extract_str(data, "crop", ""))
            .with_variable("hours", extract_str(data, "hours", "")),
        MarketEventType::OrderCancelled => params
            .with_variable("crop", extract_str(data, "crop", ""))
            .with_variable("reason", extract_str(data, "reason", "")),
        MarketEventType::HaulerEnRoute => params
            .with_variable("crop", extract_str(data, "crop", ""))
            .with_variable("hauler_name", extract_str(data, "haulerName", ""))
            .with_variable("eta", extract_str(data, "eta", "")),
        MarketEventType::PickupComplete => params
            .with_variable("crop", extract_str(data, "crop", ""))
            .with_variable("quantity", extract_str(data, "quantity", "")),
        MarketEventType::OrderDelivered => params,
        MarketEventType::DropPointAssigned => params
            .with_variable("crop", extract_str(data, "crop", ""))
            .with_variable("drop_point", extract_str(data, "dropPoint", ""))
            .with_variable("deadline", extract_str(data, "deadline", "")),
        MarketEventType::Unknown => unreachable!("filtered above"),
    };

    Some(params)
}

/// Safely extract a string field from the event payload.
///
/// Numbers render via their string form so upstream producers may send
/// either; missing fields use the default and the templates elide them.
fn extract_str(data: &serde_json::Value, key: &str, default: &str) -> String {
    data.get(key)
        .map(|v| match v {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use mandilink_shared::events::Language;
    use mandilink_shared::retry::RetryPolicy;

    use crate::channels::{MockPushProvider, MockSmsProvider, PushChannel, SmsChannel};
    use crate::dispatch::idempotency::InMemoryIdempotencyCache;
    use crate::models::{FarmerPreferences, InAppNotification, NewInAppNotification};
    use crate::preference::PreferenceEvaluator;
    use crate::repository::traits::{
        MockDeviceTokenRepositoryTrait, MockInAppRepositoryTrait, MockPreferencesRepositoryTrait,
        MockSmsLogRepositoryTrait,
    };
    use crate::template::TemplateEngine;

    fn envelope(event_id: &str, event_type: MarketEventType) -> EventEnvelope {
        EventEnvelope {
            event_id: event_id.to_string(),
            event_type,
            farmer_id: "farmer-001".to_string(),
            occurred_at: Utc::now(),
            data: serde_json::json!({
                "orderId": "ORD-1001",
                "crop": "Tomato",
                "quantity": 50,
                "price": 35,
                "total": 1750,
                "language": "kn",
            }),
        }
    }

    fn stored_row(id: i64, new: &NewInAppNotification) -> InAppNotification {
        InAppNotification {
            id,
            farmer_id: new.farmer_id.clone(),
            notification_type: new.notification_type,
            title: new.title.clone(),
            body: new.body.clone(),
            deeplink: new.deeplink.clone(),
            metadata: new.metadata.clone(),
            is_read: false,
            created_at: Utc::now(),
        }
    }

    /// Dispatcher wired against a push-only pipeline: no phone in the
    /// payload keeps SMS out of these tests
    fn dispatcher(inapp_repo: MockInAppRepositoryTrait) -> EventDispatcher {
        let mut prefs_repo = MockPreferencesRepositoryTrait::new();
        prefs_repo.expect_get().returning(|farmer_id| {
            let mut p = FarmerPreferences::defaults_for(farmer_id);
            p.quiet_hours_enabled = false;
            Ok(Some(p))
        });
        let evaluator = Arc::new(PreferenceEvaluator::new(Arc::new(prefs_repo), 330));

        let sms_channel = Arc::new(SmsChannel::new(
            Arc::new(MockSmsProvider::new()),
            Arc::new(MockSmsLogRepositoryTrait::new()),
            Arc::new(TemplateEngine::with_defaults()),
            RetryPolicy::default(),
            20,
            330,
        ));

        let mut push_provider = MockPushProvider::new();
        push_provider
            .expect_send()
            .returning(|_, _, _| Ok("push_msg".to_string()));
        let mut token_repo = MockDeviceTokenRepositoryTrait::new();
        token_repo.expect_list_active().returning(|_| Ok(vec![]));

        let push_channel = Arc::new(PushChannel::new(
            Arc::new(push_provider),
            Arc::new(token_repo),
            evaluator.clone(),
        ));

        let inapp_repo = Arc::new(inapp_repo);
        let router = Arc::new(NotificationRouter::new(
            evaluator,
            sms_channel,
            push_channel,
            inapp_repo.clone(),
            Arc::new(TemplateEngine::with_defaults()),
        ));

        EventDispatcher::new(
            router,
            inapp_repo,
            Arc::new(InMemoryIdempotencyCache::new(64)),
        )
    }

    #[tokio::test]
    async fn test_dispatch_creates_notification_once() {
        let mut inapp_repo = MockInAppRepositoryTrait::new();
        inapp_repo
            .expect_find_by_event_id()
            .returning(|_| Ok(None));
        // the idempotency contract: exactly one stored record per event id
        inapp_repo
            .expect_create()
            .times(1)
            .returning(|new| Ok(stored_row(1, new)));

        let dispatcher = dispatcher(inapp_repo);
        let env = envelope("evt-100", MarketEventType::OrderMatched);

        let first = dispatcher.dispatch(&env).await.unwrap();
        let second = dispatcher.dispatch(&env).await.unwrap();

        assert!(first);
        assert!(!second);
    }

    #[tokio::test]
    async fn test_dispatch_durable_dedup_across_cache_miss() {
        let mut inapp_repo = MockInAppRepositoryTrait::new();
        // simulates a restart: the cache is cold but the row exists
        inapp_repo.expect_find_by_event_id().returning(|event_id| {
            Ok(Some(InAppNotification {
                id: 9,
                farmer_id: "farmer-001".to_string(),
                notification_type: NotificationType::OrderMatched,
                title: "t".to_string(),
                body: "b".to_string(),
                deeplink: None,
                metadata: serde_json::json!({ METADATA_EVENT_ID: event_id }),
                is_read: false,
                created_at: Utc::now(),
            }))
        });
        inapp_repo.expect_create().times(0);

        let dispatcher = dispatcher(inapp_repo);
        let env = envelope("evt-101", MarketEventType::OrderMatched);

        let handled = dispatcher.dispatch(&env).await.unwrap();
        assert!(!handled);
    }

    #[tokio::test]
    async fn test_dispatch_unknown_type_rejected() {
        let mut inapp_repo = MockInAppRepositoryTrait::new();
        inapp_repo
            .expect_find_by_event_id()
            .returning(|_| Ok(None));
        inapp_repo.expect_create().times(0);

        let dispatcher = dispatcher(inapp_repo);
        let env = envelope("evt-102", MarketEventType::Unknown);

        let handled = dispatcher.dispatch(&env).await.unwrap();
        assert!(!handled);
    }

    #[tokio::test]
    async fn test_durable_lookup_error_releases_mark() {
        let mut inapp_repo = MockInAppRepositoryTrait::new();
        let mut calls = 0;
        inapp_repo
            .expect_find_by_event_id()
            .times(2)
            .returning_st(move |_| {
                calls += 1;
                if calls == 1 {
                    Err(crate::error::NotifyError::Database(
                        sqlx::Error::PoolTimedOut,
                    ))
                } else {
                    Ok(None)
                }
            });
        inapp_repo
            .expect_create()
            .times(1)
            .returning(|new| Ok(stored_row(2, new)));

        let dispatcher = dispatcher(inapp_repo);
        let env = envelope("evt-103", MarketEventType::OrderMatched);

        // first delivery fails on the durable lookup
        assert!(dispatcher.dispatch(&env).await.is_err());
        // redelivery is not shadow-banned by the cache
        assert!(dispatcher.dispatch(&env).await.unwrap());
    }

    #[test]
    fn test_build_params_order_matched() {
        let env = envelope("evt-104", MarketEventType::OrderMatched);
        let params = build_params(&env).unwrap();

        assert_eq!(params.farmer_id, "farmer-001");
        assert_eq!(params.language, Language::Kannada);
        assert_eq!(params.variables.get("crop").unwrap(), "Tomato");
        assert_eq!(params.variables.get("quantity").unwrap(), "50");
        assert_eq!(params.variables.get("total").unwrap(), "1750");
        assert_eq!(params.deeplink.as_deref(), Some("/orders/ORD-1001"));
        assert_eq!(
            params.metadata.get(METADATA_EVENT_ID).unwrap(),
            "evt-104"
        );
        // no phone in the payload, so SMS stays off
        assert!(params.phone.is_none());
    }

    #[test]
    fn test_build_params_includes_phone_when_present() {
        let mut env = envelope("evt-105", MarketEventType::PaymentReceived);
        env.data["phone"] = serde_json::json!("+919876543210");
        env.data["amount"] = serde_json::json!(1750);

        let params = build_params(&env).unwrap();

        assert_eq!(params.phone.as_deref(), Some("+919876543210"));
        assert_eq!(params.variables.get("amount").unwrap(), "1750");
    }

    #[test]
    fn test_build_params_unknown_is_none() {
        let env = envelope("evt-106", MarketEventType::Unknown);
        assert!(build_params(&env).is_none());
    }

    #[test]
    fn test_extract_str_variants() {
        let data = serde_json::json!({"s": "text", "n": 42});

        assert_eq!(extract_str(&data, "s", "d"), "text");
        assert_eq!(extract_str(&data, "n", "d"), "42");
        assert_eq!(extract_str(&data, "missing", "d"), "d");
    }
}
