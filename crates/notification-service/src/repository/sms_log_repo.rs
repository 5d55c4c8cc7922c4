//! SMS delivery log repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::traits::SmsLogRepositoryTrait;
use crate::error::Result;
use crate::models::{NewSmsDeliveryLog, SmsDeliveryLog, SmsStatus};

/// Data access for SMS delivery logs (quota accounting + audit)
pub struct SmsLogRepository {
    pool: PgPool,
}

impl SmsLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SmsLogRepositoryTrait for SmsLogRepository {
    async fn create(&self, new: &NewSmsDeliveryLog) -> Result<SmsDeliveryLog> {
        let row = sqlx::query_as::<_, SmsDeliveryLog>(
            r#"
            INSERT INTO sms_delivery_logs
                (farmer_id, phone_number, template_key, status, retry_count,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, 0, NOW(), NOW())
            RETURNING id, farmer_id, phone_number, template_key, status,
                      retry_count, message_id, error_message, created_at, updated_at
            "#,
        )
        .bind(&new.farmer_id)
        .bind(&new.phone_number)
        .bind(new.template_key)
        .bind(SmsStatus::Pending)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn record_attempt(&self, id: i64, retry_count: i32, error: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE sms_delivery_logs
            SET retry_count = $2, error_message = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(retry_count)
        .bind(error)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn mark_sent(&self, id: i64, retry_count: i32, message_id: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE sms_delivery_logs
            SET status = $2, retry_count = $3, message_id = $4, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(SmsStatus::Sent)
        .bind(retry_count)
        .bind(message_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn mark_failed(&self, id: i64, retry_count: i32, error: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE sms_delivery_logs
            SET status = $2, retry_count = $3, error_message = $4, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(SmsStatus::Failed)
        .bind(retry_count)
        .bind(error)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn count_sent_since(&self, farmer_id: &str, since: DateTime<Utc>) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM sms_delivery_logs
            WHERE farmer_id = $1
              AND status IN ($2, $3)
              AND created_at >= $4
            "#,
        )
        .bind(farmer_id)
        .bind(SmsStatus::Sent)
        .bind(SmsStatus::Delivered)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }
}
