//! Farmer preferences repository.

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::PreferencesRepositoryTrait;
use crate::error::Result;
use crate::models::FarmerPreferences;

/// Data access for the one-row-per-farmer preference table
pub struct PreferencesRepository {
    pool: PgPool,
}

impl PreferencesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PreferencesRepositoryTrait for PreferencesRepository {
    async fn get(&self, farmer_id: &str) -> Result<Option<FarmerPreferences>> {
        let prefs = sqlx::query_as::<_, FarmerPreferences>(
            r#"
            SELECT id, farmer_id, sms_enabled, push_enabled, quiet_hours_enabled,
                   quiet_hours_start, quiet_hours_end, notification_level,
                   order_updates, payment_alerts, educational_content,
                   created_at, updated_at
            FROM farmer_preferences
            WHERE farmer_id = $1
            "#,
        )
        .bind(farmer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(prefs)
    }

    async fn create_defaults(&self, farmer_id: &str) -> Result<FarmerPreferences> {
        let defaults = FarmerPreferences::defaults_for(farmer_id);

        // ON CONFLICT DO NOTHING + RETURNING yields no row when another
        // request created the defaults first; fall back to a select so both
        // racers observe the same row.
        let inserted = sqlx::query_as::<_, FarmerPreferences>(
            r#"
            INSERT INTO farmer_preferences
                (farmer_id, sms_enabled, push_enabled, quiet_hours_enabled,
                 quiet_hours_start, quiet_hours_end, notification_level,
                 order_updates, payment_alerts, educational_content,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW(), NOW())
            ON CONFLICT (farmer_id) DO NOTHING
            RETURNING id, farmer_id, sms_enabled, push_enabled, quiet_hours_enabled,
                      quiet_hours_start, quiet_hours_end, notification_level,
                      order_updates, payment_alerts, educational_content,
                      created_at, updated_at
            "#,
        )
        .bind(&defaults.farmer_id)
        .bind(defaults.sms_enabled)
        .bind(defaults.push_enabled)
        .bind(defaults.quiet_hours_enabled)
        .bind(&defaults.quiet_hours_start)
        .bind(&defaults.quiet_hours_end)
        .bind(defaults.notification_level)
        .bind(defaults.order_updates)
        .bind(defaults.payment_alerts)
        .bind(defaults.educational_content)
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(row) => Ok(row),
            None => {
                let existing = self.get(farmer_id).await?;
                existing.ok_or_else(|| {
                    crate::error::NotifyError::Internal(format!(
                        "preference row vanished during lazy create: farmer_id={farmer_id}"
                    ))
                })
            }
        }
    }

    async fn save(&self, prefs: &FarmerPreferences) -> Result<FarmerPreferences> {
        let saved = sqlx::query_as::<_, FarmerPreferences>(
            r#"
            UPDATE farmer_preferences
            SET sms_enabled = $2,
                push_enabled = $3,
                quiet_hours_enabled = $4,
                quiet_hours_start = $5,
                quiet_hours_end = $6,
                notification_level = $7,
                order_updates = $8,
                payment_alerts = $9,
                educational_content = $10,
                updated_at = NOW()
            WHERE farmer_id = $1
            RETURNING id, farmer_id, sms_enabled, push_enabled, quiet_hours_enabled,
                      quiet_hours_start, quiet_hours_end, notification_level,
                      order_updates, payment_alerts, educational_content,
                      created_at, updated_at
            "#,
        )
        .bind(&prefs.farmer_id)
        .bind(prefs.sms_enabled)
        .bind(prefs.push_enabled)
        .bind(prefs.quiet_hours_enabled)
        .bind(&prefs.quiet_hours_start)
        .bind(&prefs.quiet_hours_end)
        .bind(prefs.notification_level)
        .bind(prefs.order_updates)
        .bind(prefs.payment_alerts)
        .bind(prefs.educational_content)
        .fetch_one(&self.pool)
        .await?;

        Ok(saved)
    }
}
