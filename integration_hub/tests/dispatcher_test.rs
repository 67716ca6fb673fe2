use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use integration_hub::domain::entities::{OutboxQueue, OutboxRecord, OutboxStatus};
use integration_hub::domain::error::HubError;
use integration_hub::domain::repository::OutboxRepository;
use integration_hub::jobs::dispatcher::DispatcherJob;
use mockall::mock;
use mockall::predicate::*;
use std::sync::Arc;

mock! {
    pub OutboxRepositoryImpl {}

    #[async_trait]
    impl OutboxRepository for OutboxRepositoryImpl {
        async fn list_undelivered(&self, queue: OutboxQueue) -> Result<Vec<OutboxRecord>, HubError>;
        async fn list(&self, queue: OutboxQueue, status: Option<&str>, limit: i64) -> Result<Vec<OutboxRecord>, HubError>;
        async fn mark_sent(&self, queue: OutboxQueue, id: i64, attempt_count: i32) -> Result<(), HubError>;
        async fn mark_failed(
            &self,
            queue: OutboxQueue,
            id: i64,
            attempt_count: i32,
            error: &str,
            next_attempt_at: DateTime<Utc>,
        ) -> Result<(), HubError>;
        async fn reset_to_pending(&self, queue: OutboxQueue, id: i64) -> Result<Option<OutboxRecord>, HubError>;
    }
}

fn pending_record(id: i64) -> OutboxRecord {
    OutboxRecord {
        id,
        event_type: "wallet_action".to_string(),
        target_url: "http://operator.test/v2/players/p1/withdraw".to_string(),
        payload: serde_json::json!({"amount": 10.0}),
        status: OutboxStatus::Pending,
        attempt_count: 0,
        next_attempt_at: Utc::now() - Duration::seconds(1),
        last_error: None,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn skips_records_not_yet_due_for_retry() {
    use integration_hub::infrastructure::http_client::DispatchClient;

    let mut repo = MockOutboxRepositoryImpl::new();

    repo.expect_list_undelivered()
        .with(eq(OutboxQueue::ToOperator))
        .returning(|_| {
            let mut record = pending_record(1);
            record.next_attempt_at = Utc::now() + Duration::seconds(60);
            Ok(vec![record])
        });
    repo.expect_list_undelivered()
        .with(eq(OutboxQueue::ToRgs))
        .returning(|_| Ok(vec![]));

    // mark_sent/mark_failed must never be reached: the record isn't due yet.
    repo.expect_mark_sent().times(0);
    repo.expect_mark_failed().times(0);

    let client = Arc::new(DispatchClient::new(60, 3, 0.01));
    let dispatcher = DispatcherJob::new(Arc::new(repo), client);

    dispatcher.run_once().await;
}

#[tokio::test]
async fn marks_record_failed_with_backoff_when_downstream_unreachable() {
    use integration_hub::infrastructure::http_client::DispatchClient;

    let mut repo = MockOutboxRepositoryImpl::new();

    repo.expect_list_undelivered()
        .with(eq(OutboxQueue::ToOperator))
        .returning(|_| Ok(vec![pending_record(7)]));
    repo.expect_list_undelivered()
        .with(eq(OutboxQueue::ToRgs))
        .returning(|_| Ok(vec![]));

    repo.expect_mark_failed()
        .withf(|queue, id, attempt_count, _error, next_attempt_at| {
            *queue == OutboxQueue::ToOperator
                && *id == 7
                && *attempt_count == 1
                && *next_attempt_at > Utc::now()
        })
        .times(1)
        .returning(|_, _, _, _, _| Ok(()));

    // Target host does not resolve, so the client reports DownstreamUnavailable.
    let client = Arc::new(DispatchClient::new(60, 0, 0.01));
    let dispatcher = DispatcherJob::new(Arc::new(repo), client);

    dispatcher.run_once().await;
}
