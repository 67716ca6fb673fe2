use chrono::{DateTime, Utc};
use common::WalletAction;
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::entities::{
    IdempotencyKey, NewTransaction, OutboxRecord, OutboxStatus, Transaction, TransactionStatus,
};

#[derive(Debug, FromRow)]
pub struct TransactionModel {
    pub id: i64,
    pub ref_id: String,
    pub player_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub direction: WalletAction,
    pub status: TransactionStatus,
    pub reason: Option<String>,
    pub balance_cents: Option<i64>,
    pub correlation_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<TransactionModel> for Transaction {
    fn from(m: TransactionModel) -> Self {
        Self {
            id: m.id,
            ref_id: m.ref_id,
            player_id: m.player_id,
            amount_cents: m.amount_cents,
            currency: m.currency,
            direction: m.direction,
            status: m.status,
            reason: m.reason,
            balance_cents: m.balance_cents,
            correlation_id: m.correlation_id,
            created_at: m.created_at,
        }
    }
}

impl From<&NewTransaction> for TransactionModel {
    fn from(t: &NewTransaction) -> Self {
        Self {
            id: 0,
            ref_id: t.ref_id.clone(),
            player_id: t.player_id.clone(),
            amount_cents: t.amount_cents,
            currency: t.currency.clone(),
            direction: t.direction,
            status: t.status,
            reason: None,
            balance_cents: t.balance_cents,
            correlation_id: t.correlation_id,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, FromRow)]
pub struct OutboxModel {
    pub id: i64,
    pub event_type: String,
    pub target_url: String,
    pub payload: serde_json::Value,
    pub status: OutboxStatus,
    pub attempt_count: i32,
    pub next_attempt_at: DateTime<Utc>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<OutboxModel> for OutboxRecord {
    fn from(m: OutboxModel) -> Self {
        Self {
            id: m.id,
            event_type: m.event_type,
            target_url: m.target_url,
            payload: m.payload,
            status: m.status,
            attempt_count: m.attempt_count,
            next_attempt_at: m.next_attempt_at,
            last_error: m.last_error,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct IdempotencyKeyModel {
    pub key: String,
    pub request_hash: String,
    pub response_body: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<IdempotencyKeyModel> for IdempotencyKey {
    fn from(m: IdempotencyKeyModel) -> Self {
        Self {
            key: m.key,
            request_hash: m.request_hash,
            response_body: m.response_body,
            created_at: m.created_at,
        }
    }
}
