//! The two write paths that must commit a ledger row and an outbox row
//! atomically. Kept off
//! `TransactionRepository`/`OutboxRepository` so those stay single-table;
//! `PostgresIngressRepository` owns the pool directly and opens the
//! transaction itself.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{NewTransaction, Transaction, TransactionStatus};
use crate::domain::error::HubError;
use crate::domain::repository::IngressRepository;
use crate::infrastructure::persistence::models::TransactionModel;

pub struct PostgresIngressRepository {
    pool: PgPool,
}

impl PostgresIngressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IngressRepository for PostgresIngressRepository {
    async fn insert_with_operator_outbox(
        &self,
        transaction: NewTransaction,
        event_type: &str,
        target_url: &str,
        payload: serde_json::Value,
    ) -> Result<Transaction, HubError> {
        let mut tx = self.pool.begin().await?;
        let model = TransactionModel::from(&transaction);

        let saved = sqlx::query_as::<_, TransactionModel>(
            r#"
            INSERT INTO transactions (
                ref_id, player_id, amount_cents, currency, direction, status, balance_cents, correlation_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&model.ref_id)
        .bind(&model.player_id)
        .bind(model.amount_cents)
        .bind(&model.currency)
        .bind(model.direction)
        .bind(model.status)
        .bind(model.balance_cents)
        .bind(model.correlation_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"INSERT INTO operator_webhook_outbox (event_type, target_url, payload) VALUES ($1, $2, $3)"#,
        )
        .bind(event_type)
        .bind(target_url)
        .bind(payload)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Transaction::from(saved))
    }

    async fn mark_sent_with_rgs_outbox(
        &self,
        ref_id: &str,
        correlation_id: Uuid,
        event_type: &str,
        target_url: &str,
        payload: serde_json::Value,
    ) -> Result<Transaction, HubError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, TransactionModel>(
            r#"
            UPDATE transactions
            SET status = $1
            WHERE ref_id = $2 AND correlation_id = $3
            RETURNING *
            "#,
        )
        .bind(TransactionStatus::Sent)
        .bind(ref_id)
        .bind(correlation_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(HubError::UnknownReference)?;

        sqlx::query(
            r#"INSERT INTO rgs_webhook_outbox (event_type, target_url, payload) VALUES ($1, $2, $3)"#,
        )
        .bind(event_type)
        .bind(target_url)
        .bind(payload)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Transaction::from(updated))
    }
}
