use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::entities::{OutboxQueue, OutboxRecord};
use crate::domain::error::HubError;
use crate::domain::repository::OutboxRepository;
use crate::infrastructure::persistence::models::OutboxModel;

/// Backs both outbox queues. `rgs_webhook_outbox` and `operator_webhook_outbox`
/// are identically shaped tables; which one a call touches is picked by
/// `OutboxQueue`, never by untrusted input (callers parse the queue name
/// through `OutboxQueue::from_str_loose` before it reaches this repository).
pub struct PostgresOutboxRepository {
    pool: PgPool,
}

impl PostgresOutboxRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn table(queue: OutboxQueue) -> &'static str {
    match queue {
        OutboxQueue::ToOperator => "operator_webhook_outbox",
        OutboxQueue::ToRgs => "rgs_webhook_outbox",
    }
}

#[async_trait]
impl OutboxRepository for PostgresOutboxRepository {
    async fn list_undelivered(&self, queue: OutboxQueue) -> Result<Vec<OutboxRecord>, HubError> {
        let sql = format!(
            "SELECT * FROM {} WHERE status != 'sent' ORDER BY created_at ASC",
            table(queue)
        );
        let models = sqlx::query_as::<_, OutboxModel>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(models.into_iter().map(OutboxRecord::from).collect())
    }

    async fn list(
        &self,
        queue: OutboxQueue,
        status: Option<&str>,
        limit: i64,
    ) -> Result<Vec<OutboxRecord>, HubError> {
        let models = if let Some(status) = status {
            let sql = format!(
                "SELECT * FROM {} WHERE status = $1::outbox_status ORDER BY created_at DESC LIMIT $2",
                table(queue)
            );
            sqlx::query_as::<_, OutboxModel>(&sql)
                .bind(status)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
        } else {
            let sql = format!(
                "SELECT * FROM {} ORDER BY created_at DESC LIMIT $1",
                table(queue)
            );
            sqlx::query_as::<_, OutboxModel>(&sql)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
        };
        Ok(models.into_iter().map(OutboxRecord::from).collect())
    }

    async fn mark_sent(&self, queue: OutboxQueue, id: i64, attempt_count: i32) -> Result<(), HubError> {
        let sql = format!(
            "UPDATE {} SET status = 'sent', attempt_count = $1, last_error = NULL WHERE id = $2",
            table(queue)
        );
        sqlx::query(&sql)
            .bind(attempt_count)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn mark_failed(
        &self,
        queue: OutboxQueue,
        id: i64,
        attempt_count: i32,
        error: &str,
        next_attempt_at: DateTime<Utc>,
    ) -> Result<(), HubError> {
        let sql = format!(
            "UPDATE {} SET status = 'failed', attempt_count = $1, last_error = $2, next_attempt_at = $3 WHERE id = $4",
            table(queue)
        );
        sqlx::query(&sql)
            .bind(attempt_count)
            .bind(error)
            .bind(next_attempt_at)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn reset_to_pending(&self, queue: OutboxQueue, id: i64) -> Result<Option<OutboxRecord>, HubError> {
        let sql = format!(
            "UPDATE {} SET status = 'pending', last_error = NULL, next_attempt_at = now() WHERE id = $1 RETURNING *",
            table(queue)
        );
        let model = sqlx::query_as::<_, OutboxModel>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(model.map(OutboxRecord::from))
    }
}
