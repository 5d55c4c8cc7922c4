//! In-app notification repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::traits::InAppRepositoryTrait;
use crate::error::Result;
use crate::models::{InAppNotification, METADATA_EVENT_ID, NewInAppNotification};

/// Data access for the farmer inbox
pub struct InAppRepository {
    pool: PgPool,
}

impl InAppRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InAppRepositoryTrait for InAppRepository {
    async fn create(&self, new: &NewInAppNotification) -> Result<InAppNotification> {
        let row = sqlx::query_as::<_, InAppNotification>(
            r#"
            INSERT INTO in_app_notifications
                (farmer_id, notification_type, title, body, deeplink, metadata,
                 is_read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, FALSE, NOW())
            RETURNING id, farmer_id, notification_type, title, body, deeplink,
                      metadata, is_read, created_at
            "#,
        )
        .bind(&new.farmer_id)
        .bind(new.notification_type)
        .bind(&new.title)
        .bind(&new.body)
        .bind(&new.deeplink)
        .bind(&new.metadata)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_event_id(&self, event_id: &str) -> Result<Option<InAppNotification>> {
        let row = sqlx::query_as::<_, InAppNotification>(&format!(
            r#"
            SELECT id, farmer_id, notification_type, title, body, deeplink,
                   metadata, is_read, created_at
            FROM in_app_notifications
            WHERE metadata->>'{METADATA_EVENT_ID}' = $1
            LIMIT 1
            "#
        ))
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list(
        &self,
        farmer_id: &str,
        limit: i64,
        offset: i64,
        unread_only: bool,
    ) -> Result<Vec<InAppNotification>> {
        let rows = sqlx::query_as::<_, InAppNotification>(
            r#"
            SELECT id, farmer_id, notification_type, title, body, deeplink,
                   metadata, is_read, created_at
            FROM in_app_notifications
            WHERE farmer_id = $1 AND (NOT $2 OR is_read = FALSE)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(farmer_id)
        .bind(unread_only)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn unread_count(&self, farmer_id: &str) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM in_app_notifications
            WHERE farmer_id = $1 AND is_read = FALSE
            "#,
        )
        .bind(farmer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    async fn mark_read(&self, farmer_id: &str, id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE in_app_notifications
            SET is_read = TRUE
            WHERE id = $1 AND farmer_id = $2
            "#,
        )
        .bind(id)
        .bind(farmer_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_read(&self, farmer_id: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE in_app_notifications
            SET is_read = TRUE
            WHERE farmer_id = $1 AND is_read = FALSE
            "#,
        )
        .bind(farmer_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, farmer_id: &str, id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM in_app_notifications
            WHERE id = $1 AND farmer_id = $2
            "#,
        )
        .bind(id)
        .bind(farmer_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_read_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        // retention only touches rows the farmer has already seen
        let result = sqlx::query(
            r#"
            DELETE FROM in_app_notifications
            WHERE is_read = TRUE AND created_at < $1
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
