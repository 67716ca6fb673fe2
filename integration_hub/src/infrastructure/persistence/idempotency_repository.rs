use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::entities::IdempotencyKey;
use crate::domain::error::HubError;
use crate::domain::repository::IdempotencyRepository;
use crate::infrastructure::persistence::models::IdempotencyKeyModel;

pub struct PostgresIdempotencyRepository {
    pool: PgPool,
}

impl PostgresIdempotencyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdempotencyRepository for PostgresIdempotencyRepository {
    async fn find(&self, key: &str) -> Result<Option<IdempotencyKey>, HubError> {
        let record = sqlx::query_as::<_, IdempotencyKeyModel>(
            r#"SELECT key, request_hash, response_body, created_at FROM idempotency_keys WHERE key = $1"#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record.map(IdempotencyKey::from))
    }

    async fn store(
        &self,
        key: &str,
        request_hash: &str,
        response_body: serde_json::Value,
    ) -> Result<(), HubError> {
        sqlx::query(
            r#"INSERT INTO idempotency_keys (key, request_hash, response_body) VALUES ($1, $2, $3)"#,
        )
        .bind(key)
        .bind(request_hash)
        .bind(response_body)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
