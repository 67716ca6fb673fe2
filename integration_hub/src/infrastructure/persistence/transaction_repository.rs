use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::Transaction;
use crate::domain::error::HubError;
use crate::domain::repository::TransactionRepository;
use crate::infrastructure::persistence::models::TransactionModel;

pub struct PostgresTransactionRepository {
    pool: PgPool,
}

impl PostgresTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionRepository for PostgresTransactionRepository {
    async fn find_by_ref_and_correlation(
        &self,
        ref_id: &str,
        correlation_id: Uuid,
    ) -> Result<Option<Transaction>, HubError> {
        let model = sqlx::query_as::<_, TransactionModel>(
            r#"SELECT * FROM transactions WHERE ref_id = $1 AND correlation_id = $2"#,
        )
        .bind(ref_id)
        .bind(correlation_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(model.map(Transaction::from))
    }
}
