//! Push delivery channel.
//!
//! Fans one notification out to every active device token of a farmer,
//! concurrently, and self-heals the token registry: tokens the provider
//! reports as invalid are deactivated before the call returns. Transient
//! failures are counted but not retried here.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use mandilink_shared::events::NotificationType;

use super::provider::{PushMessage, PushProvider, PushProviderError};
use crate::error::Result;
use crate::preference::PreferenceEvaluator;
use crate::repository::DeviceTokenRepositoryTrait;

/// One push fan-out request
#[derive(Debug, Clone)]
pub struct PushRequest {
    pub farmer_id: String,
    pub notification_type: NotificationType,
    pub title: String,
    pub body: String,
    pub deeplink: Option<String>,
    /// Opaque data delivered with the notification
    pub data: HashMap<String, String>,
    pub high_priority: bool,
    /// Critical notifications set this; quiet hours are then ignored
    pub bypass_quiet_hours: bool,
}

/// Outcome of one push fan-out
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushOutcome {
    pub success: bool,
    pub success_count: usize,
    pub failure_count: usize,
    /// Tokens the provider rejected as unregistered; already deactivated
    pub invalid_tokens: Vec<String>,
    /// True when delivery was skipped entirely (quiet hours)
    pub skipped: bool,
}

impl PushOutcome {
    /// Quiet-hours skip: a deliberate no-op, reported as success
    pub fn skipped_quiet_hours() -> Self {
        Self {
            success: true,
            success_count: 0,
            failure_count: 0,
            invalid_tokens: Vec::new(),
            skipped: true,
        }
    }

    /// No registered devices: trivially successful
    pub fn no_tokens() -> Self {
        Self {
            success: true,
            success_count: 0,
            failure_count: 0,
            invalid_tokens: Vec::new(),
            skipped: false,
        }
    }
}

/// Push delivery channel
pub struct PushChannel {
    provider: Arc<dyn PushProvider>,
    token_repo: Arc<dyn DeviceTokenRepositoryTrait>,
    evaluator: Arc<PreferenceEvaluator>,
}

impl PushChannel {
    pub fn new(
        provider: Arc<dyn PushProvider>,
        token_repo: Arc<dyn DeviceTokenRepositoryTrait>,
        evaluator: Arc<PreferenceEvaluator>,
    ) -> Self {
        Self {
            provider,
            token_repo,
            evaluator,
        }
    }

    /// Send to every active device of a farmer.
    ///
    /// Partial failure is expected and tolerated: the fan-out waits for all
    /// outcomes and the result aggregates them (`success` when at least one
    /// device was reached).
    #[instrument(
        skip(self, request),
        fields(
            farmer_id = %request.farmer_id,
            notification_type = %request.notification_type,
            high_priority = request.high_priority,
        )
    )]
    pub async fn send_to_farmer(&self, request: &PushRequest) -> Result<PushOutcome> {
        if !request.bypass_quiet_hours
            && self.evaluator.quiet_hours_active(&request.farmer_id).await?
        {
            debug!("quiet hours active, skipping push");
            return Ok(PushOutcome::skipped_quiet_hours());
        }

        let tokens = self.token_repo.list_active(&request.farmer_id).await?;
        if tokens.is_empty() {
            debug!("no active device tokens");
            return Ok(PushOutcome::no_tokens());
        }

        let mut data = request.data.clone();
        if let Some(deeplink) = &request.deeplink {
            data.insert("deeplink".to_string(), deeplink.clone());
        }
        data.insert(
            "notificationType".to_string(),
            request.notification_type.to_string(),
        );

        let message = PushMessage {
            title: request.title.clone(),
            body: request.body.clone(),
            data,
        };

        // concurrent fan-out; every token gets its attempt even when others fail
        let send_futures: Vec<_> = tokens
            .iter()
            .map(|device| {
                let provider = self.provider.clone();
                let message = message.clone();
                let token = device.token.clone();
                let high_priority = request.high_priority;
                async move {
                    let result = provider.send(&token, &message, high_priority).await;
                    (token, result)
                }
            })
            .collect();

        let results = join_all(send_futures).await;

        let mut success_count = 0;
        let mut failure_count = 0;
        let mut invalid_tokens = Vec::new();

        for (token, result) in results {
            match result {
                Ok(_) => success_count += 1,
                Err(PushProviderError::InvalidToken) => {
                    failure_count += 1;
                    invalid_tokens.push(token);
                }
                Err(PushProviderError::Transient(reason)) => {
                    failure_count += 1;
                    warn!(
                        token_prefix = %token.chars().take(8).collect::<String>(),
                        %reason,
                        "transient push failure"
                    );
                }
            }
        }

        if !invalid_tokens.is_empty() {
            // permanent failures self-heal the registry
            let deactivated = self.token_repo.deactivate_by_tokens(&invalid_tokens).await?;
            info!(deactivated, "deactivated invalid device tokens");
        }

        info!(
            total = success_count + failure_count,
            success_count, failure_count, "push fan-out complete"
        );

        Ok(PushOutcome {
            success: success_count > 0,
            success_count,
            failure_count,
            invalid_tokens,
            skipped: false,
        })
    }
}
