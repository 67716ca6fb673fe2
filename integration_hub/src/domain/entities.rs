use chrono::{DateTime, Utc};
use common::WalletAction;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ledger status. `Sent` and `Rejected`/`Failed` are terminal; only
/// `Initiated` transitions (to `Sent`, on webhook receipt).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Initiated,
    Sent,
    Rejected,
    Failed,
}

/// Delivery-lifecycle status of a single outbox row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "outbox_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OutboxStatus {
    Pending,
    Sent,
    Failed,
}

/// Which of the two outbox tables a record belongs to. Not a DB column:
/// the queue is implicit in which table a row lives in, but handlers and
/// the dispatcher need to name a queue explicitly (admin replay, listing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutboxQueue {
    ToOperator,
    ToRgs,
}

impl OutboxQueue {
    pub fn as_str(self) -> &'static str {
        match self {
            OutboxQueue::ToOperator => "operator",
            OutboxQueue::ToRgs => "rgs",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s {
            "operator" => Some(OutboxQueue::ToOperator),
            "rgs" => Some(OutboxQueue::ToRgs),
            _ => None,
        }
    }
}

/// One row per `(refId, direction)` request. The ledger owns the status of
/// business intent; it never mutates outbox rows and is never mutated by them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
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

/// Fields needed to insert a new ledger row; `id` and `created_at` are
/// assigned by the database.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub ref_id: String,
    pub player_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub direction: WalletAction,
    pub status: TransactionStatus,
    pub balance_cents: Option<i64>,
    pub correlation_id: Uuid,
}

/// One durable pending-delivery row. The outbox owns delivery lifecycle and
/// never mutates ledger fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxRecord {
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

/// Idempotency record: `key` is unique, `request_hash` never changes for a
/// given key, and `response_body` is replayed verbatim on a cache hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdempotencyKey {
    pub key: String,
    pub request_hash: String,
    pub response_body: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
