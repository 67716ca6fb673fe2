//! Outbox listing and forced replay for operators.

use std::sync::Arc;

use crate::domain::entities::{OutboxQueue, OutboxRecord};
use crate::domain::error::HubError;
use crate::domain::repository::OutboxRepository;

pub struct AdminUseCase {
    outbox_repo: Arc<dyn OutboxRepository>,
}

impl AdminUseCase {
    pub fn new(outbox_repo: Arc<dyn OutboxRepository>) -> Self {
        Self { outbox_repo }
    }

    pub async fn list_outbox(
        &self,
        queue: OutboxQueue,
        status: Option<&str>,
        limit: i64,
    ) -> Result<Vec<OutboxRecord>, HubError> {
        self.outbox_repo.list(queue, status, limit).await
    }

    pub async fn force_replay(
        &self,
        queue: OutboxQueue,
        record_id: i64,
    ) -> Result<OutboxRecord, HubError> {
        self.outbox_repo
            .reset_to_pending(queue, record_id)
            .await?
            .ok_or(HubError::NotFound)
    }
}
