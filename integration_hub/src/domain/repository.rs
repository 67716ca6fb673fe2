use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::entities::{IdempotencyKey, NewTransaction, OutboxQueue, OutboxRecord, Transaction};
use super::error::HubError;

/// Read access to the ledger. Both write paths that must be atomic with an
/// outbox insert (initial ingress, and the incoming-webhook status flip) are
/// not on this trait; see `infrastructure::persistence::ingress`.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn find_by_ref_and_correlation(
        &self,
        ref_id: &str,
        correlation_id: Uuid,
    ) -> Result<Option<Transaction>, HubError>;
}

/// Access to one of the two outbox queues. Both `rgs_webhook_outbox` and
/// `operator_webhook_outbox` share this contract; the concrete Postgres
/// implementation picks the table by `OutboxQueue`.
#[async_trait]
pub trait OutboxRepository: Send + Sync {
    async fn list_undelivered(&self, queue: OutboxQueue) -> Result<Vec<OutboxRecord>, HubError>;

    async fn list(
        &self,
        queue: OutboxQueue,
        status: Option<&str>,
        limit: i64,
    ) -> Result<Vec<OutboxRecord>, HubError>;

    /// Terminal success: `status = sent`, `attempt_count` set to the attempt
    /// that succeeded, `last_error` cleared. A `sent` row is never revisited
    /// by this method again (enforced by the dispatcher, not the query).
    async fn mark_sent(&self, queue: OutboxQueue, id: i64, attempt_count: i32) -> Result<(), HubError>;

    /// Retryable failure: `status = failed`, `last_error` set,
    /// `next_attempt_at` moved forward. `list_undelivered` returns both
    /// `pending` and `failed` rows; the dispatcher itself filters on whether
    /// `next_attempt_at` has elapsed.
    async fn mark_failed(
        &self,
        queue: OutboxQueue,
        id: i64,
        attempt_count: i32,
        error: &str,
        next_attempt_at: DateTime<Utc>,
    ) -> Result<(), HubError>;

    /// Force-replay: flip back to pending, clear `last_error`/`next_attempt_at`.
    async fn reset_to_pending(&self, queue: OutboxQueue, id: i64) -> Result<Option<OutboxRecord>, HubError>;
}

/// The two cross-table atomic writes the ingress and incoming-webhook flows
/// each need one of. Kept as its own narrow port rather than folded into
/// `TransactionRepository`/`OutboxRepository` so those stay single-table.
#[async_trait]
pub trait IngressRepository: Send + Sync {
    async fn insert_with_operator_outbox(
        &self,
        transaction: NewTransaction,
        event_type: &str,
        target_url: &str,
        payload: serde_json::Value,
    ) -> Result<Transaction, HubError>;

    async fn mark_sent_with_rgs_outbox(
        &self,
        ref_id: &str,
        correlation_id: Uuid,
        event_type: &str,
        target_url: &str,
        payload: serde_json::Value,
    ) -> Result<Transaction, HubError>;
}

/// Idempotency-key lookup and storage backing request deduplication.
#[async_trait]
pub trait IdempotencyRepository: Send + Sync {
    async fn find(&self, key: &str) -> Result<Option<IdempotencyKey>, HubError>;

    async fn store(
        &self,
        key: &str,
        request_hash: &str,
        response_body: serde_json::Value,
    ) -> Result<(), HubError>;
}
