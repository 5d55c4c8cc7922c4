//! Device token repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::traits::DeviceTokenRepositoryTrait;
use crate::error::Result;
use crate::models::{DeviceToken, DeviceType};

/// Data access for the push token registry
pub struct DeviceTokenRepository {
    pool: PgPool,
}

impl DeviceTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeviceTokenRepositoryTrait for DeviceTokenRepository {
    async fn upsert(
        &self,
        farmer_id: &str,
        token: &str,
        device_type: DeviceType,
    ) -> Result<DeviceToken> {
        // Re-registering an existing token reactivates it, so an app
        // reinstall on the same device heals a previously pruned token.
        let row = sqlx::query_as::<_, DeviceToken>(
            r#"
            INSERT INTO device_tokens (farmer_id, token, device_type, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, TRUE, NOW(), NOW())
            ON CONFLICT (farmer_id, token)
            DO UPDATE SET device_type = EXCLUDED.device_type,
                          is_active = TRUE,
                          updated_at = NOW()
            RETURNING id, farmer_id, token, device_type, is_active, created_at, updated_at
            "#,
        )
        .bind(farmer_id)
        .bind(token)
        .bind(device_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_active(&self, farmer_id: &str) -> Result<Vec<DeviceToken>> {
        let rows = sqlx::query_as::<_, DeviceToken>(
            r#"
            SELECT id, farmer_id, token, device_type, is_active, created_at, updated_at
            FROM device_tokens
            WHERE farmer_id = $1 AND is_active = TRUE
            ORDER BY updated_at DESC
            "#,
        )
        .bind(farmer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn deactivate(&self, farmer_id: &str, token: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE device_tokens
            SET is_active = FALSE, updated_at = NOW()
            WHERE farmer_id = $1 AND token = $2 AND is_active = TRUE
            "#,
        )
        .bind(farmer_id)
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn deactivate_by_tokens(&self, tokens: &[String]) -> Result<u64> {
        if tokens.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            UPDATE device_tokens
            SET is_active = FALSE, updated_at = NOW()
            WHERE token = ANY($1) AND is_active = TRUE
            "#,
        )
        .bind(tokens)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_inactive_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM device_tokens
            WHERE is_active = FALSE AND updated_at < $1
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
