//! SMS delivery channel.
//!
//! Quota enforcement, the sequential retry loop with fixed backoff, and the
//! one-log-row-per-send audit contract. Expected failures (quota, exhausted
//! retries) come back as an `SmsOutcome`, never as an error.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use mandilink_shared::events::{Language, NotificationType};
use mandilink_shared::retry::RetryPolicy;

use super::provider::{SmsProvider, SmsProviderError};
use crate::error::Result;
use crate::models::NewSmsDeliveryLog;
use crate::preference::quiet_hours;
use crate::repository::SmsLogRepositoryTrait;
use crate::template::TemplateEngine;

/// One SMS send request
#[derive(Debug, Clone)]
pub struct SmsRequest {
    pub farmer_id: String,
    pub phone: String,
    pub template_key: NotificationType,
    pub variables: HashMap<String, String>,
    pub language: Language,
}

/// Outcome of one SMS send operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsOutcome {
    pub success: bool,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

impl SmsOutcome {
    pub fn sent(message_id: String) -> Self {
        Self {
            success: true,
            message_id: Some(message_id),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error.into()),
        }
    }
}

/// SMS delivery channel
///
/// Retries are strictly sequential within one send operation: repeated
/// sends to the same phone number must never race each other.
pub struct SmsChannel {
    provider: Arc<dyn SmsProvider>,
    log_repo: Arc<dyn SmsLogRepositoryTrait>,
    template_engine: Arc<TemplateEngine>,
    retry_policy: RetryPolicy,
    daily_quota: i64,
    utc_offset_minutes: i32,
}

impl SmsChannel {
    pub fn new(
        provider: Arc<dyn SmsProvider>,
        log_repo: Arc<dyn SmsLogRepositoryTrait>,
        template_engine: Arc<TemplateEngine>,
        retry_policy: RetryPolicy,
        daily_quota: i64,
        utc_offset_minutes: i32,
    ) -> Self {
        Self {
            provider,
            log_repo,
            template_engine,
            retry_policy,
            daily_quota,
            utc_offset_minutes,
        }
    }

    /// Send one SMS.
    ///
    /// Flow: quota check (no log row is created for a rejected send), then
    /// one PENDING log row, then up to `max_attempts` provider calls with
    /// the configured backoff between them. Every attempt updates the row;
    /// the final state is always SENT or FAILED.
    #[instrument(
        skip(self, request),
        fields(
            farmer_id = %request.farmer_id,
            template_key = %request.template_key,
        )
    )]
    pub async fn send(&self, request: &SmsRequest) -> Result<SmsOutcome> {
        let since = quiet_hours::local_midnight_utc(Utc::now(), self.utc_offset_minutes);
        let sent_today = self
            .log_repo
            .count_sent_since(&request.farmer_id, since)
            .await?;

        if sent_today >= self.daily_quota {
            warn!(
                sent_today,
                quota = self.daily_quota,
                "daily SMS quota exceeded, rejecting send"
            );
            return Ok(SmsOutcome::failed(format!(
                "daily SMS quota exceeded ({}/{})",
                sent_today, self.daily_quota
            )));
        }

        let text = self
            .template_engine
            .render(request.template_key, request.language, &request.variables)
            .body;

        let log = self
            .log_repo
            .create(&NewSmsDeliveryLog {
                farmer_id: request.farmer_id.clone(),
                phone_number: request.phone.clone(),
                template_key: request.template_key,
            })
            .await?;

        let mut last_error = String::new();

        for attempt in 1..=self.retry_policy.max_attempts {
            match self.provider.send(&request.phone, &text).await {
                Ok(message_id) => {
                    self.log_repo
                        .mark_sent(log.id, attempt as i32, &message_id)
                        .await?;

                    info!(log_id = log.id, attempt, %message_id, "SMS sent");
                    return Ok(SmsOutcome::sent(message_id));
                }
                Err(SmsProviderError::Permanent(reason)) => {
                    // the provider will keep rejecting this send; stop here
                    warn!(log_id = log.id, attempt, %reason, "permanent SMS failure");
                    self.log_repo
                        .mark_failed(log.id, attempt as i32, &reason)
                        .await?;
                    return Ok(SmsOutcome::failed(reason));
                }
                Err(SmsProviderError::Transient(reason)) => {
                    warn!(log_id = log.id, attempt, %reason, "transient SMS failure");
                    last_error = reason;

                    if self.retry_policy.should_retry(attempt) {
                        self.log_repo
                            .record_attempt(log.id, attempt as i32, &last_error)
                            .await?;
                        tokio::time::sleep(self.retry_policy.delay_after_attempt(attempt)).await;
                    } else {
                        self.log_repo
                            .mark_failed(log.id, attempt as i32, &last_error)
                            .await?;
                    }
                }
            }
        }

        warn!(
            log_id = log.id,
            attempts = self.retry_policy.max_attempts,
            "SMS attempts exhausted"
        );
        Ok(SmsOutcome::failed(last_error))
    }
}
