//! Notification router.
//!
//! The aggregation point of the engine: decides criticality, consults the
//! preference evaluator, renders the message, persists the in-app record and
//! invokes the delivery channels. Channel failures never propagate out of
//! here; callers always get a structured result.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::channels::{PushChannel, PushRequest, SmsChannel, SmsOutcome, SmsRequest};
use crate::models::NewInAppNotification;
use crate::preference::{ChannelPermissions, PreferenceEvaluator};
use crate::repository::InAppRepositoryTrait;
use crate::template::TemplateEngine;

use super::types::{NotificationResult, SendNotificationParams};

/// Notification router
pub struct NotificationRouter {
    evaluator: Arc<PreferenceEvaluator>,
    sms_channel: Arc<SmsChannel>,
    push_channel: Arc<PushChannel>,
    inapp_repo: Arc<dyn InAppRepositoryTrait>,
    template_engine: Arc<TemplateEngine>,
}

impl NotificationRouter {
    pub fn new(
        evaluator: Arc<PreferenceEvaluator>,
        sms_channel: Arc<SmsChannel>,
        push_channel: Arc<PushChannel>,
        inapp_repo: Arc<dyn InAppRepositoryTrait>,
        template_engine: Arc<TemplateEngine>,
    ) -> Self {
        Self {
            evaluator,
            sms_channel,
            push_channel,
            inapp_repo,
            template_engine,
        }
    }

    /// Route one notification.
    ///
    /// The in-app record is persisted concurrently with the channel sends
    /// and is never skipped because a channel failed; a storage failure is
    /// recovered locally (logged, `in_app_id = None`) while the channel
    /// attempts proceed. Overall success means at least one delivery
    /// surface - SMS, push or the in-app store - succeeded.
    #[instrument(
        skip(self, params),
        fields(
            farmer_id = %params.farmer_id,
            notification_type = %params.notification_type,
        )
    )]
    pub async fn send_notification(&self, params: SendNotificationParams) -> NotificationResult {
        let is_critical = params.notification_type.is_critical() || params.force_sms;
        let category = params.notification_type.category();

        let permissions = match self
            .evaluator
            .should_send(&params.farmer_id, is_critical, category)
            .await
        {
            Ok(permissions) => permissions,
            Err(e) => {
                // without readable preferences no channel is attempted, but
                // the in-app record must still be stored
                error!(error = %e, "preference evaluation failed, suppressing channels");
                ChannelPermissions::NONE
            }
        };

        let rendered =
            self.template_engine
                .render(params.notification_type, params.language, &params.variables);

        let store_fut = async {
            let new = NewInAppNotification {
                farmer_id: params.farmer_id.clone(),
                notification_type: params.notification_type,
                title: rendered.title.clone(),
                body: rendered.body.clone(),
                deeplink: params.deeplink.clone(),
                metadata: serde_json::Value::Object(params.metadata.clone()),
            };
            match self.inapp_repo.create(&new).await {
                Ok(row) => Some(row.id),
                Err(e) => {
                    error!(error = %e, "failed to store in-app notification");
                    None
                }
            }
        };

        let sms_fut = async {
            let phone = params.phone.as_ref()?;
            if !permissions.sms {
                return None;
            }
            let request = SmsRequest {
                farmer_id: params.farmer_id.clone(),
                phone: phone.clone(),
                template_key: params.notification_type,
                variables: params.variables.clone(),
                language: params.language,
            };
            Some(match self.sms_channel.send(&request).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(error = %e, "SMS channel error");
                    SmsOutcome::failed(e.to_string())
                }
            })
        };

        let push_fut = async {
            if !permissions.push {
                return None;
            }
            let request = PushRequest {
                farmer_id: params.farmer_id.clone(),
                notification_type: params.notification_type,
                title: rendered.title.clone(),
                body: rendered.body.clone(),
                deeplink: params.deeplink.clone(),
                data: std::collections::HashMap::new(),
                high_priority: is_critical,
                bypass_quiet_hours: is_critical,
            };
            Some(match self.push_channel.send_to_farmer(&request).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(error = %e, "push channel error");
                    crate::channels::PushOutcome {
                        success: false,
                        success_count: 0,
                        failure_count: 0,
                        invalid_tokens: Vec::new(),
                        skipped: false,
                    }
                }
            })
        };

        let (in_app_id, sms, push) = tokio::join!(store_fut, sms_fut, push_fut);

        let sms_success = sms.as_ref().is_some_and(|o: &SmsOutcome| o.success);
        let push_success = push
            .as_ref()
            .is_some_and(|o: &crate::channels::PushOutcome| o.success);
        let success = sms_success || push_success || in_app_id.is_some();

        if is_critical && !sms_success && !push_success {
            // non-fatal: the in-app record may still have landed, but a
            // critical notification missed both real-time channels
            warn!(
                sms_attempted = sms.is_some(),
                push_attempted = push.is_some(),
                "critical notification failed on all delivery channels"
            );
        }

        info!(
            is_critical,
            success,
            sms_success,
            push_success,
            in_app_id = ?in_app_id,
            "notification routed"
        );

        NotificationResult {
            farmer_id: params.farmer_id,
            notification_type: params.notification_type,
            is_critical,
            success,
            sms,
            push,
            in_app_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use chrono::Utc;
    use mandilink_shared::events::{Language, NotificationType};
    use mandilink_shared::retry::RetryPolicy;

    use crate::channels::{MockPushProvider, MockSmsProvider};
    use crate::models::{
        DeviceToken, DeviceType, FarmerPreferences, InAppNotification, NotificationLevel,
    };
    use crate::repository::traits::{
        MockDeviceTokenRepositoryTrait, MockInAppRepositoryTrait, MockPreferencesRepositoryTrait,
        MockSmsLogRepositoryTrait,
    };

    struct Fixture {
        prefs: FarmerPreferences,
        sms_provider: MockSmsProvider,
        push_provider: MockPushProvider,
        sms_log_repo: MockSmsLogRepositoryTrait,
        token_repo: MockDeviceTokenRepositoryTrait,
        inapp_repo: MockInAppRepositoryTrait,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                prefs: FarmerPreferences::defaults_for("farmer-001"),
                sms_provider: MockSmsProvider::new(),
                push_provider: MockPushProvider::new(),
                sms_log_repo: MockSmsLogRepositoryTrait::new(),
                token_repo: MockDeviceTokenRepositoryTrait::new(),
                inapp_repo: MockInAppRepositoryTrait::new(),
            }
        }

        /// Wire a router from the mocks; quiet hours default to disabled so
        /// tests control suppression through preferences explicitly
        fn build(mut self) -> NotificationRouter {
            self.prefs.quiet_hours_enabled = false;

            let prefs = self.prefs.clone();
            let mut prefs_repo = MockPreferencesRepositoryTrait::new();
            prefs_repo
                .expect_get()
                .returning(move |_| Ok(Some(prefs.clone())));

            let evaluator = Arc::new(PreferenceEvaluator::new(Arc::new(prefs_repo), 330));

            let sms_channel = Arc::new(SmsChannel::new(
                Arc::new(self.sms_provider),
                Arc::new(self.sms_log_repo),
                Arc::new(TemplateEngine::with_defaults()),
                RetryPolicy {
                    max_attempts: 3,
                    delays: vec![std::time::Duration::from_millis(1); 3],
                },
                20,
                330,
            ));

            let push_channel = Arc::new(PushChannel::new(
                Arc::new(self.push_provider),
                Arc::new(self.token_repo),
                evaluator.clone(),
            ));

            NotificationRouter::new(
                evaluator,
                sms_channel,
                push_channel,
                Arc::new(self.inapp_repo),
                Arc::new(TemplateEngine::with_defaults()),
            )
        }
    }

    fn stored_row(id: i64, new: &crate::models::NewInAppNotification) -> InAppNotification {
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

    fn device(token: &str) -> DeviceToken {
        DeviceToken {
            id: 1,
            farmer_id: "farmer-001".to_string(),
            token: token.to_string(),
            device_type: DeviceType::Android,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn order_matched_params() -> SendNotificationParams {
        SendNotificationParams::new("farmer-001", NotificationType::OrderMatched)
            .with_variable("crop", "Tomato")
            .with_variable("quantity", "50")
            .with_variable("price", "35")
            .with_variable("total", "1750")
            .with_phone("+919876543210")
    }

    #[tokio::test]
    async fn test_critical_notification_goes_everywhere() {
        let mut fx = Fixture::new();

        fx.sms_provider
            .expect_send()
            .times(1)
            .returning(|_, _| Ok("sms_msg".to_string()));
        fx.sms_log_repo
            .expect_count_sent_since()
            .returning(|_, _| Ok(0));
        fx.sms_log_repo.expect_create().returning(|new| {
            Ok(crate::models::SmsDeliveryLog {
                id: 1,
                farmer_id: new.farmer_id.clone(),
                phone_number: new.phone_number.clone(),
                template_key: new.template_key,
                status: crate::models::SmsStatus::Pending,
                retry_count: 0,
                message_id: None,
                error_message: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
        });
        fx.sms_log_repo
            .expect_mark_sent()
            .returning(|_, _, _| Ok(()));

        fx.push_provider
            .expect_send()
            .times(1)
            .returning(|_, _, _| Ok("push_msg".to_string()));
        fx.token_repo
            .expect_list_active()
            .returning(|_| Ok(vec![device("token-a")]));

        fx.inapp_repo
            .expect_create()
            .times(1)
            .returning(|new| Ok(stored_row(42, new)));

        let result = fx.build().send_notification(order_matched_params()).await;

        assert!(result.is_critical);
        assert!(result.success);
        assert!(result.sms_success());
        assert!(result.push_success());
        assert_eq!(result.in_app_id, Some(42));
    }

    #[tokio::test]
    async fn test_non_critical_skips_sms() {
        let mut fx = Fixture::new();

        // SMS is reserved for critical notifications, even with a phone present
        fx.sms_provider.expect_send().times(0);

        fx.push_provider
            .expect_send()
            .times(1)
            .returning(|_, _, _| Ok("push_msg".to_string()));
        fx.token_repo
            .expect_list_active()
            .returning(|_| Ok(vec![device("token-a")]));

        fx.inapp_repo
            .expect_create()
            .returning(|new| Ok(stored_row(1, new)));

        let params = SendNotificationParams::new("farmer-001", NotificationType::OrderDelivered)
            .with_variable("order_id", "ORD-9")
            .with_phone("+919876543210");

        let result = fx.build().send_notification(params).await;

        assert!(!result.is_critical);
        assert!(result.success);
        assert!(result.sms.is_none());
        assert!(result.push_success());
    }

    #[tokio::test]
    async fn test_suppressed_channels_still_store_in_app() {
        let mut fx = Fixture::new();
        // farmer only wants critical notifications and has muted order updates
        fx.prefs.notification_level = NotificationLevel::Critical;
        fx.prefs.order_updates = false;

        fx.sms_provider.expect_send().times(0);
        fx.push_provider.expect_send().times(0);
        fx.token_repo.expect_list_active().times(0);

        fx.inapp_repo
            .expect_create()
            .times(1)
            .returning(|new| Ok(stored_row(5, new)));

        let params = SendNotificationParams::new("farmer-001", NotificationType::OrderDelivered)
            .with_phone("+919876543210");

        let result = fx.build().send_notification(params).await;

        // both channels suppressed, storage succeeded: overall success
        assert!(result.success);
        assert!(result.sms.is_none());
        assert!(result.push.is_none());
        assert_eq!(result.in_app_id, Some(5));
    }

    #[tokio::test]
    async fn test_storage_failure_recovered_channels_proceed() {
        let mut fx = Fixture::new();

        fx.inapp_repo
            .expect_create()
            .returning(|_| Err(crate::error::NotifyError::Database(sqlx::Error::PoolTimedOut)));

        fx.push_provider
            .expect_send()
            .times(1)
            .returning(|_, _, _| Ok("push_msg".to_string()));
        fx.token_repo
            .expect_list_active()
            .returning(|_| Ok(vec![device("token-a")]));

        let params = SendNotificationParams::new("farmer-001", NotificationType::PickupComplete)
            .with_variable("crop", "Onion")
            .with_variable("quantity", "80");

        let result = fx.build().send_notification(params).await;

        assert!(result.success);
        assert_eq!(result.in_app_id, None);
        assert!(result.push_success());
    }

    #[tokio::test]
    async fn test_no_phone_means_no_sms_attempt() {
        let mut fx = Fixture::new();

        fx.sms_provider.expect_send().times(0);
        fx.push_provider
            .expect_send()
            .returning(|_, _, _| Ok("push_msg".to_string()));
        fx.token_repo
            .expect_list_active()
            .returning(|_| Ok(vec![device("token-a")]));
        fx.inapp_repo
            .expect_create()
            .returning(|new| Ok(stored_row(2, new)));

        let mut params = order_matched_params();
        params.phone = None;

        let result = fx.build().send_notification(params).await;

        assert!(result.is_critical);
        assert!(result.sms.is_none());
        assert!(result.success);
    }

    #[tokio::test]
    async fn test_force_sms_promotes_non_critical() {
        let mut fx = Fixture::new();

        fx.sms_provider
            .expect_send()
            .times(1)
            .returning(|_, _| Ok("sms_msg".to_string()));
        fx.sms_log_repo
            .expect_count_sent_since()
            .returning(|_, _| Ok(0));
        fx.sms_log_repo.expect_create().returning(|new| {
            Ok(crate::models::SmsDeliveryLog {
                id: 2,
                farmer_id: new.farmer_id.clone(),
                phone_number: new.phone_number.clone(),
                template_key: new.template_key,
                status: crate::models::SmsStatus::Pending,
                retry_count: 0,
                message_id: None,
                error_message: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
        });
        fx.sms_log_repo
            .expect_mark_sent()
            .returning(|_, _, _| Ok(()));

        fx.push_provider
            .expect_send()
            .returning(|_, _, _| Ok("push_msg".to_string()));
        fx.token_repo
            .expect_list_active()
            .returning(|_| Ok(vec![device("token-a")]));
        fx.inapp_repo
            .expect_create()
            .returning(|new| Ok(stored_row(3, new)));

        let params = SendNotificationParams::new("farmer-001", NotificationType::DropPointAssigned)
            .with_variable("crop", "Maize")
            .with_variable("drop_point", "Hubli yard 3")
            .with_variable("deadline", "17:00")
            .with_phone("+919876543210")
            .with_force_sms(true);

        let result = fx.build().send_notification(params).await;

        assert!(result.is_critical);
        assert!(result.sms_success());
    }

    #[tokio::test]
    async fn test_kannada_rendering_reaches_store_and_push() {
        let mut fx = Fixture::new();

        fx.sms_provider
            .expect_send()
            .withf(|_, text| text.contains("50") && text.contains("ಹೊಸ ಖರೀದಿದಾರ"))
            .times(1)
            .returning(|_, _| Ok("sms_msg".to_string()));
        fx.sms_log_repo
            .expect_count_sent_since()
            .returning(|_, _| Ok(0));
        fx.sms_log_repo.expect_create().returning(|new| {
            Ok(crate::models::SmsDeliveryLog {
                id: 3,
                farmer_id: new.farmer_id.clone(),
                phone_number: new.phone_number.clone(),
                template_key: new.template_key,
                status: crate::models::SmsStatus::Pending,
                retry_count: 0,
                message_id: None,
                error_message: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
        });
        fx.sms_log_repo
            .expect_mark_sent()
            .returning(|_, _, _| Ok(()));

        fx.push_provider
            .expect_send()
            .withf(|_, message, high_priority| {
                message.title == "🎉 ಖರೀದಿದಾರ ಹೊಂದಾಣಿಕೆ ಆಗಿದೆ!" && *high_priority
            })
            .times(1)
            .returning(|_, _, _| Ok("push_msg".to_string()));
        fx.token_repo
            .expect_list_active()
            .returning(|_| Ok(vec![device("token-a")]));

        fx.inapp_repo
            .expect_create()
            .withf(|new| new.title == "🎉 ಖರೀದಿದಾರ ಹೊಂದಾಣಿಕೆ ಆಗಿದೆ!" && new.body.contains("50"))
            .returning(|new| Ok(stored_row(4, new)));

        let params = order_matched_params().with_language(Language::Kannada);
        let result = fx.build().send_notification(params).await;

        assert!(result.success);
        assert!(result.sms_success());
        assert!(result.push_success());
    }
}
