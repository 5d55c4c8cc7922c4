//! Retention sweeps.
//!
//! Periodic cleanup of data with a bounded useful life: inactive device
//! tokens past the retention horizon are hard-deleted, and read in-app
//! notifications past theirs are dropped. Unread notifications are never
//! touched. Failures are logged and retried on the next sweep, never fatal.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::repository::{DeviceTokenRepositoryTrait, InAppRepositoryTrait};

/// Outcome of one retention sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionReport {
    pub tokens_deleted: u64,
    pub notifications_deleted: u64,
}

/// Retention job
pub struct RetentionJob {
    token_repo: Arc<dyn DeviceTokenRepositoryTrait>,
    inapp_repo: Arc<dyn InAppRepositoryTrait>,
    device_token_retention_days: i64,
    inapp_retention_days: i64,
}

impl RetentionJob {
    pub fn new(
        token_repo: Arc<dyn DeviceTokenRepositoryTrait>,
        inapp_repo: Arc<dyn InAppRepositoryTrait>,
        device_token_retention_days: i64,
        inapp_retention_days: i64,
    ) -> Self {
        Self {
            token_repo,
            inapp_repo,
            device_token_retention_days,
            inapp_retention_days,
        }
    }

    /// Run one sweep
    #[instrument(skip(self))]
    pub async fn run_once(&self) -> Result<RetentionReport> {
        let now = Utc::now();

        let token_cutoff = now - Duration::days(self.device_token_retention_days);
        let tokens_deleted = self.token_repo.delete_inactive_before(token_cutoff).await?;

        let inapp_cutoff = now - Duration::days(self.inapp_retention_days);
        let notifications_deleted = self.inapp_repo.delete_read_before(inapp_cutoff).await?;

        info!(tokens_deleted, notifications_deleted, "retention sweep complete");

        Ok(RetentionReport {
            tokens_deleted,
            notifications_deleted,
        })
    }

    /// Run sweeps forever at the given interval
    pub async fn run_loop(self, interval_seconds: u64) {
        let mut ticker =
            tokio::time::interval(std::time::Duration::from_secs(interval_seconds.max(1)));
        // the first tick fires immediately; skip it so startup stays quiet
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if let Err(e) = self.run_once().await {
                warn!(error = %e, "retention sweep failed, will retry next interval");
            }
        }
    }
}
