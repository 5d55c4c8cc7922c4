//! Preference management service.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::{NotifyError, Result};
use crate::models::{FarmerPreferences, NotificationLevel};
use crate::preference::quiet_hours;
use crate::repository::PreferencesRepositoryTrait;

/// Partial preference update; absent fields keep their current value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferencesRequest {
    pub sms_enabled: Option<bool>,
    pub push_enabled: Option<bool>,
    pub quiet_hours_enabled: Option<bool>,
    pub quiet_hours_start: Option<String>,
    pub quiet_hours_end: Option<String>,
    pub notification_level: Option<NotificationLevel>,
    pub order_updates: Option<bool>,
    pub payment_alerts: Option<bool>,
    pub educational_content: Option<bool>,
}

/// Preference management service
pub struct PreferenceService {
    repo: Arc<dyn PreferencesRepositoryTrait>,
}

impl PreferenceService {
    pub fn new(repo: Arc<dyn PreferencesRepositoryTrait>) -> Self {
        Self { repo }
    }

    /// Fetch a farmer's preferences, creating the default row on first read
    #[instrument(skip(self))]
    pub async fn get_preferences(&self, farmer_id: &str) -> Result<FarmerPreferences> {
        match self.repo.get(farmer_id).await? {
            Some(prefs) => Ok(prefs),
            None => self.repo.create_defaults(farmer_id).await,
        }
    }

    /// Apply a partial update to a farmer's preferences
    #[instrument(skip(self, request))]
    pub async fn update_preferences(
        &self,
        farmer_id: &str,
        request: UpdatePreferencesRequest,
    ) -> Result<FarmerPreferences> {
        for time in [&request.quiet_hours_start, &request.quiet_hours_end]
            .into_iter()
            .flatten()
        {
            if quiet_hours::parse_hhmm(time).is_none() {
                return Err(NotifyError::Validation(format!(
                    "invalid quiet hours time: {time} (expected HH:MM)"
                )));
            }
        }

        let mut prefs = self.get_preferences(farmer_id).await?;

        if let Some(v) = request.sms_enabled {
            prefs.sms_enabled = v;
        }
        if let Some(v) = request.push_enabled {
            prefs.push_enabled = v;
        }
        if let Some(v) = request.quiet_hours_enabled {
            prefs.quiet_hours_enabled = v;
        }
        if let Some(v) = request.quiet_hours_start {
            prefs.quiet_hours_start = v;
        }
        if let Some(v) = request.quiet_hours_end {
            prefs.quiet_hours_end = v;
        }
        if let Some(v) = request.notification_level {
            prefs.notification_level = v;
        }
        if let Some(v) = request.order_updates {
            prefs.order_updates = v;
        }
        if let Some(v) = request.payment_alerts {
            prefs.payment_alerts = v;
        }
        if let Some(v) = request.educational_content {
            prefs.educational_content = v;
        }

        let saved = self.repo.save(&prefs).await?;
        info!(farmer_id, "preferences updated");
        Ok(saved)
    }
}
