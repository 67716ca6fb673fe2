//! Background dispatcher. A single task draining both outbox queues in
//! insertion order on its own fixed schedule, in the shape of a
//! `RetryFailedTransactionJob`-style worker loop.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{error, warn};

use crate::domain::entities::{OutboxQueue, OutboxRecord};
use crate::domain::repository::OutboxRepository;
use crate::infrastructure::http_client::{DeliveryOutcome, DispatchClient};

pub struct DispatcherJob {
    outbox_repo: Arc<dyn OutboxRepository>,
    client: Arc<DispatchClient>,
}

impl DispatcherJob {
    pub fn new(outbox_repo: Arc<dyn OutboxRepository>, client: Arc<DispatchClient>) -> Self {
        Self {
            outbox_repo,
            client,
        }
    }

    /// One full pass over both queues. Never aborts on a per-record error;
    /// a record that fails to update just gets picked up again next pass.
    pub async fn run_once(&self) {
        for queue in [OutboxQueue::ToOperator, OutboxQueue::ToRgs] {
            self.drain_queue(queue).await;
        }
    }

    async fn drain_queue(&self, queue: OutboxQueue) {
        let records = match self.outbox_repo.list_undelivered(queue).await {
            Ok(records) => records,
            Err(err) => {
                error!("failed to list undelivered {} outbox records: {}", queue.as_str(), err);
                return;
            }
        };

        let now = Utc::now();
        for record in records {
            if record.next_attempt_at > now {
                continue;
            }
            self.dispatch_one(queue, record).await;
        }
    }

    async fn dispatch_one(&self, queue: OutboxQueue, record: OutboxRecord) {
        let attempt_count = record.attempt_count + 1;

        let outcome = self
            .client
            .post_with_retry(&record.target_url, &record.payload)
            .await;

        match outcome {
            Ok(DeliveryOutcome::Delivered { status, .. }) if status < 500 => {
                if let Err(err) = self.outbox_repo.mark_sent(queue, record.id, attempt_count).await {
                    error!("failed to mark {} record {} sent: {}", queue.as_str(), record.id, err);
                }
            }
            Ok(DeliveryOutcome::Delivered { status, body, .. }) => {
                let message = format!("downstream rejected with status {}: {}", status, body);
                warn!("{} record {} failed: {}", queue.as_str(), record.id, message);
                self.retry_later(queue, record.id, attempt_count, &message).await;
            }
            Err(err) => {
                warn!("{} record {} dispatch error: {}", queue.as_str(), record.id, err);
                self.retry_later(queue, record.id, attempt_count, &err.to_string()).await;
            }
        }
    }

    async fn retry_later(&self, queue: OutboxQueue, id: i64, attempt_count: i32, message: &str) {
        let backoff_seconds = 2i64.saturating_pow(attempt_count.clamp(0, 30) as u32);
        let next_attempt_at = Utc::now() + Duration::seconds(backoff_seconds);
        if let Err(err) = self
            .outbox_repo
            .mark_failed(queue, id, attempt_count, message, next_attempt_at)
            .await
        {
            error!("failed to mark {} record {} failed: {}", queue.as_str(), id, err);
        }
    }
}
