//! Preference evaluator.
//!
//! The single decision point for "may this notification go out over SMS and
//! push". The router consults it before touching any delivery channel; the
//! in-app record is never gated here.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use mandilink_shared::events::NotificationCategory;

use super::quiet_hours;
use crate::error::Result;
use crate::models::{FarmerPreferences, NotificationLevel};
use crate::repository::PreferencesRepositoryTrait;

/// Channel send permissions for one notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelPermissions {
    pub sms: bool,
    pub push: bool,
}

impl ChannelPermissions {
    pub const NONE: Self = Self {
        sms: false,
        push: false,
    };
}

/// Preference evaluator
///
/// Loads (lazily creating) the farmer's settings and applies the decision
/// order: level filter, category gate, then per-channel rules with the
/// critical bypass for quiet hours.
pub struct PreferenceEvaluator {
    prefs_repo: Arc<dyn PreferencesRepositoryTrait>,
    utc_offset_minutes: i32,
}

impl PreferenceEvaluator {
    pub fn new(prefs_repo: Arc<dyn PreferencesRepositoryTrait>, utc_offset_minutes: i32) -> Self {
        Self {
            prefs_repo,
            utc_offset_minutes,
        }
    }

    /// Load a farmer's preferences, creating the default row on first read
    pub async fn load_preferences(&self, farmer_id: &str) -> Result<FarmerPreferences> {
        match self.prefs_repo.get(farmer_id).await? {
            Some(prefs) => Ok(prefs),
            None => {
                debug!(farmer_id, "no preference row, creating defaults");
                self.prefs_repo.create_defaults(farmer_id).await
            }
        }
    }

    /// Decide SMS/push permissions for one notification
    pub async fn should_send(
        &self,
        farmer_id: &str,
        is_critical: bool,
        category: NotificationCategory,
    ) -> Result<ChannelPermissions> {
        let prefs = self.load_preferences(farmer_id).await?;
        let now_minutes = quiet_hours::local_minutes_of_day(Utc::now(), self.utc_offset_minutes);
        Ok(Self::decide(&prefs, is_critical, category, now_minutes))
    }

    /// Whether the farmer's quiet-hours window is active right now
    pub async fn quiet_hours_active(&self, farmer_id: &str) -> Result<bool> {
        let prefs = self.load_preferences(farmer_id).await?;
        let now_minutes = quiet_hours::local_minutes_of_day(Utc::now(), self.utc_offset_minutes);
        Ok(Self::quiet_hours_active_at(&prefs, now_minutes))
    }

    /// Pure decision function, separated from clock and storage for tests.
    ///
    /// Order matters:
    /// 1. MUTE silences everything.
    /// 2. Level CRITICAL silences non-critical notifications.
    /// 3. A disabled category toggle silences non-critical notifications.
    /// 4. SMS is reserved for critical notifications; push honors quiet
    ///    hours unless the notification is critical.
    pub fn decide(
        prefs: &FarmerPreferences,
        is_critical: bool,
        category: NotificationCategory,
        now_minutes: u32,
    ) -> ChannelPermissions {
        if prefs.notification_level == NotificationLevel::Mute {
            return ChannelPermissions::NONE;
        }

        if prefs.notification_level == NotificationLevel::Critical && !is_critical {
            return ChannelPermissions::NONE;
        }

        let category_enabled = match category {
            NotificationCategory::OrderUpdates => prefs.order_updates,
            NotificationCategory::PaymentAlerts => prefs.payment_alerts,
            NotificationCategory::Educational => prefs.educational_content,
        };
        if !category_enabled && !is_critical {
            return ChannelPermissions::NONE;
        }

        let quiet = Self::quiet_hours_active_at(prefs, now_minutes);

        ChannelPermissions {
            sms: prefs.sms_enabled && is_critical,
            push: prefs.push_enabled && (!quiet || is_critical),
        }
    }

    /// Quiet-hours check against a given local time.
    ///
    /// Unparseable stored HH:MM values disable the window rather than
    /// suppressing delivery.
    pub fn quiet_hours_active_at(prefs: &FarmerPreferences, now_minutes: u32) -> bool {
        if !prefs.quiet_hours_enabled {
            return false;
        }

        match (
            quiet_hours::parse_hhmm(&prefs.quiet_hours_start),
            quiet_hours::parse_hhmm(&prefs.quiet_hours_end),
        ) {
            (Some(start), Some(end)) => quiet_hours::is_window_active(now_minutes, start, end),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::traits::MockPreferencesRepositoryTrait;

    fn prefs() -> FarmerPreferences {
        FarmerPreferences::defaults_for("farmer-001")
    }

    const DAYTIME: u32 = 10 * 60; // 10:00, outside the default quiet window
    const NIGHT: u32 = 23 * 60 + 30; // 23:30, inside the default quiet window

    #[test]
    fn test_defaults_allow_push_not_sms_for_non_critical() {
        let decision = PreferenceEvaluator::decide(
            &prefs(),
            false,
            NotificationCategory::OrderUpdates,
            DAYTIME,
        );
        // SMS is reserved for critical notifications
        assert_eq!(decision, ChannelPermissions { sms: false, push: true });
    }

    #[test]
    fn test_defaults_allow_both_for_critical() {
        let decision =
            PreferenceEvaluator::decide(&prefs(), true, NotificationCategory::OrderUpdates, DAYTIME);
        assert_eq!(decision, ChannelPermissions { sms: true, push: true });
    }

    #[test]
    fn test_mute_silences_everything() {
        let mut p = prefs();
        p.notification_level = NotificationLevel::Mute;

        for is_critical in [false, true] {
            let decision = PreferenceEvaluator::decide(
                &p,
                is_critical,
                NotificationCategory::PaymentAlerts,
                DAYTIME,
            );
            assert_eq!(decision, ChannelPermissions::NONE);
        }
    }

    #[test]
    fn test_critical_level_blocks_non_critical() {
        let mut p = prefs();
        p.notification_level = NotificationLevel::Critical;

        let decision =
            PreferenceEvaluator::decide(&p, false, NotificationCategory::OrderUpdates, DAYTIME);
        assert_eq!(decision, ChannelPermissions::NONE);

        let decision =
            PreferenceEvaluator::decide(&p, true, NotificationCategory::OrderUpdates, DAYTIME);
        assert_eq!(decision, ChannelPermissions { sms: true, push: true });
    }

    #[test]
    fn test_category_gate_blocks_non_critical_only() {
        let mut p = prefs();
        p.order_updates = false;

        let decision =
            PreferenceEvaluator::decide(&p, false, NotificationCategory::OrderUpdates, DAYTIME);
        assert_eq!(decision, ChannelPermissions::NONE);

        // critical notifications pass the category gate
        let decision =
            PreferenceEvaluator::decide(&p, true, NotificationCategory::OrderUpdates, DAYTIME);
        assert_eq!(decision, ChannelPermissions { sms: true, push: true });

        // other categories unaffected
        let decision =
            PreferenceEvaluator::decide(&p, false, NotificationCategory::Educational, DAYTIME);
        assert!(decision.push);
    }

    #[test]
    fn test_quiet_hours_suppress_push_for_non_critical() {
        let decision =
            PreferenceEvaluator::decide(&prefs(), false, NotificationCategory::OrderUpdates, NIGHT);
        assert_eq!(decision, ChannelPermissions { sms: false, push: false });
    }

    #[test]
    fn test_critical_bypasses_quiet_hours() {
        let decision =
            PreferenceEvaluator::decide(&prefs(), true, NotificationCategory::OrderUpdates, NIGHT);
        assert_eq!(decision, ChannelPermissions { sms: true, push: true });
    }

    #[test]
    fn test_channel_toggles() {
        let mut p = prefs();
        p.sms_enabled = false;

        let decision =
            PreferenceEvaluator::decide(&p, true, NotificationCategory::OrderUpdates, DAYTIME);
        assert_eq!(decision, ChannelPermissions { sms: false, push: true });

        let mut p = prefs();
        p.push_enabled = false;
        let decision =
            PreferenceEvaluator::decide(&p, true, NotificationCategory::OrderUpdates, DAYTIME);
        assert_eq!(decision, ChannelPermissions { sms: true, push: false });
    }

    #[test]
    fn test_quiet_hours_disabled_flag() {
        let mut p = prefs();
        p.quiet_hours_enabled = false;

        assert!(!PreferenceEvaluator::quiet_hours_active_at(&p, NIGHT));
    }

    #[test]
    fn test_quiet_hours_bad_stored_time_disables_window() {
        let mut p = prefs();
        p.quiet_hours_start = "25:00".to_string();

        assert!(!PreferenceEvaluator::quiet_hours_active_at(&p, NIGHT));
    }

    #[tokio::test]
    async fn test_load_preferences_lazily_creates() {
        let mut repo = MockPreferencesRepositoryTrait::new();
        repo.expect_get().times(1).returning(|_| Ok(None));
        repo.expect_create_defaults()
            .times(1)
            .returning(|farmer_id| Ok(FarmerPreferences::defaults_for(farmer_id)));

        let evaluator = PreferenceEvaluator::new(Arc::new(repo), 330);
        let prefs = evaluator.load_preferences("farmer-042").await.unwrap();

        assert_eq!(prefs.farmer_id, "farmer-042");
        assert!(prefs.sms_enabled);
    }

    #[tokio::test]
    async fn test_load_preferences_uses_existing_row() {
        let mut repo = MockPreferencesRepositoryTrait::new();
        repo.expect_get().times(1).returning(|farmer_id| {
            let mut p = FarmerPreferences::defaults_for(farmer_id);
            p.sms_enabled = false;
            Ok(Some(p))
        });
        repo.expect_create_defaults().times(0);

        let evaluator = PreferenceEvaluator::new(Arc::new(repo), 330);
        let prefs = evaluator.load_preferences("farmer-042").await.unwrap();

        assert!(!prefs.sms_enabled);
    }
}
