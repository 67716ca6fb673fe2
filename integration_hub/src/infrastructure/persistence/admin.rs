use sqlx::PgPool;

use crate::domain::error::HubError;

/// `POST /admin/clear-db`: wipes all four tables in one commit.
pub async fn clear_all_tables(pool: &PgPool) -> Result<(), HubError> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM transactions").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM idempotency_keys").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM operator_webhook_outbox").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM rgs_webhook_outbox").execute(&mut *tx).await?;
    tx.commit().await?;
    Ok(())
}
