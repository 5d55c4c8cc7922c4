//! Routing request and result types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use mandilink_shared::events::{Language, NotificationType};

use crate::channels::{PushOutcome, SmsOutcome};

/// Parameters for one notification send
#[derive(Debug, Clone)]
pub struct SendNotificationParams {
    pub farmer_id: String,
    pub notification_type: NotificationType,
    /// Template variables for title/body rendering
    pub variables: HashMap<String, String>,
    pub language: Language,
    /// Farmer's phone number; SMS is only attempted when present
    pub phone: Option<String>,
    pub deeplink: Option<String>,
    /// Opaque metadata stored on the in-app record (carries the event id
    /// when dispatched from a marketplace event)
    pub metadata: serde_json::Map<String, serde_json::Value>,
    /// Caller override: treat as critical even outside the critical set
    pub force_sms: bool,
}

impl SendNotificationParams {
    pub fn new(farmer_id: impl Into<String>, notification_type: NotificationType) -> Self {
        Self {
            farmer_id: farmer_id.into(),
            notification_type,
            variables: HashMap::new(),
            language: Language::English,
            phone: None,
            deeplink: None,
            metadata: serde_json::Map::new(),
            force_sms: false,
        }
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn with_variables(mut self, variables: HashMap<String, String>) -> Self {
        self.variables.extend(variables);
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_deeplink(mut self, deeplink: impl Into<String>) -> Self {
        self.deeplink = Some(deeplink.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_force_sms(mut self, force_sms: bool) -> Self {
        self.force_sms = force_sms;
        self
    }
}

/// Aggregated outcome of one notification send.
///
/// `success` is true when any delivery surface succeeded, the in-app store
/// included; per-channel detail is retained for callers that need stricter
/// semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResult {
    pub farmer_id: String,
    pub notification_type: NotificationType,
    pub is_critical: bool,
    pub success: bool,
    /// SMS outcome; None when SMS was not permitted or no phone was given
    pub sms: Option<SmsOutcome>,
    /// Push outcome; None when push was not permitted
    pub push: Option<PushOutcome>,
    /// Id of the stored in-app record; None when storage failed
    pub in_app_id: Option<i64>,
}

impl NotificationResult {
    pub fn sms_success(&self) -> bool {
        self.sms.as_ref().is_some_and(|o| o.success)
    }

    pub fn push_success(&self) -> bool {
        self.push.as_ref().is_some_and(|o| o.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_builder() {
        let params = SendNotificationParams::new("farmer-001", NotificationType::OrderMatched)
            .with_variable("crop", "Tomato")
            .with_language(Language::Kannada)
            .with_phone("+919876543210")
            .with_deeplink("/orders/ORD-1")
            .with_metadata("eventId", serde_json::json!("evt-1"))
            .with_force_sms(true);

        assert_eq!(params.farmer_id, "farmer-001");
        assert_eq!(params.variables.get("crop").unwrap(), "Tomato");
        assert_eq!(params.language, Language::Kannada);
        assert_eq!(params.phone.as_deref(), Some("+919876543210"));
        assert_eq!(params.metadata.get("eventId").unwrap(), "evt-1");
        assert!(params.force_sms);
    }

    #[test]
    fn test_result_channel_accessors() {
        let result = NotificationResult {
            farmer_id: "farmer-001".to_string(),
            notification_type: NotificationType::OrderMatched,
            is_critical: true,
            success: true,
            sms: Some(SmsOutcome::failed("quota")),
            push: Some(PushOutcome::no_tokens()),
            in_app_id: Some(1),
        };

        assert!(!result.sms_success());
        assert!(result.push_success());
    }
}
