//! Provider capability interfaces.
//!
//! The actual SMS/push gateway wire protocols are external collaborators;
//! the channels only need these narrow send capabilities. Stub
//! implementations that log instead of calling a gateway ship in-tree so the
//! consume pipeline can be exercised end to end without external
//! dependencies; swapping in a real SDK means implementing the same trait.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// SMS provider
// ---------------------------------------------------------------------------

/// SMS gateway errors, split by retryability
#[derive(Debug, Error)]
pub enum SmsProviderError {
    /// Worth retrying: network faults, gateway congestion, 5xx responses
    #[error("transient SMS failure: {0}")]
    Transient(String),
    /// Not worth retrying: rejected number, blocked sender id
    #[error("permanent SMS failure: {0}")]
    Permanent(String),
}

/// Capability to send one SMS
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SmsProvider: Send + Sync {
    /// Send `text` to `phone`; returns the provider message id
    async fn send(&self, phone: &str, text: &str) -> Result<String, SmsProviderError>;
}

// ---------------------------------------------------------------------------
// Push provider
// ---------------------------------------------------------------------------

/// Push payload handed to the provider
#[derive(Debug, Clone)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    /// Opaque data fields delivered alongside the visible notification
    pub data: HashMap<String, String>,
}

/// Push gateway errors.
///
/// Invalid-token is its own variant because it is permanent and must feed
/// back into the token registry, unlike a transient delivery failure.
#[derive(Debug, Error)]
pub enum PushProviderError {
    /// The token is no longer registered with the provider
    #[error("invalid device token")]
    InvalidToken,
    /// Worth surfacing but not a token problem
    #[error("transient push failure: {0}")]
    Transient(String),
}

/// Capability to send one push notification to one device token
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Send to a single token; returns the provider message id
    async fn send(
        &self,
        token: &str,
        message: &PushMessage,
        high_priority: bool,
    ) -> Result<String, PushProviderError>;
}

// ---------------------------------------------------------------------------
// Stub implementations
// ---------------------------------------------------------------------------

/// Log-only SMS provider, replaced by a real gateway SDK in production
pub struct StubSmsProvider;

#[async_trait]
impl SmsProvider for StubSmsProvider {
    async fn send(&self, phone: &str, text: &str) -> Result<String, SmsProviderError> {
        let message_id = format!("sms_{}", Uuid::now_v7());

        info!(
            channel = "SMS",
            phone = %mask_phone(phone),
            message_id = %message_id,
            text_length = text.chars().count(),
            "stub SMS send"
        );

        Ok(message_id)
    }
}

/// Log-only push provider, replaced by FCM/APNs SDK calls in production
pub struct StubPushProvider;

#[async_trait]
impl PushProvider for StubPushProvider {
    async fn send(
        &self,
        token: &str,
        message: &PushMessage,
        high_priority: bool,
    ) -> Result<String, PushProviderError> {
        let message_id = format!("push_{}", Uuid::now_v7());

        info!(
            channel = "PUSH",
            token_prefix = %token.chars().take(8).collect::<String>(),
            message_id = %message_id,
            title = %message.title,
            high_priority,
            "stub push send"
        );

        Ok(message_id)
    }
}

/// Mask all but the last 4 digits of a phone number for logs
fn mask_phone(phone: &str) -> String {
    let len = phone.chars().count();
    if len <= 4 {
        return "*".repeat(len);
    }
    let visible: String = phone.chars().skip(len - 4).collect();
    format!("{}{}", "*".repeat(len - 4), visible)
}
