use std::sync::Arc;
use std::time::Duration;

use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use integration_hub::api::dto::{OutboxRecordResponse, WalletRequest, WalletResponse, WebhookAccepted, WebhookPayload};
use integration_hub::api::http_routes::{routes, AppState};
use integration_hub::config::Settings;
use integration_hub::infrastructure::http_client::DispatchClient;
use integration_hub::infrastructure::persistence::idempotency_repository::PostgresIdempotencyRepository;
use integration_hub::infrastructure::persistence::ingress::PostgresIngressRepository;
use integration_hub::infrastructure::persistence::outbox_repository::PostgresOutboxRepository;
use integration_hub::infrastructure::persistence::transaction_repository::PostgresTransactionRepository;
use integration_hub::jobs::dispatcher::DispatcherJob;
use integration_hub::use_cases::admin::AdminUseCase;
use integration_hub::use_cases::incoming_webhook::IncomingWebhookUseCase;
use integration_hub::use_cases::reconciliation::ReconciliationUseCase;
use integration_hub::use_cases::wallet_action::WalletActionUseCase;

#[derive(OpenApi)]
#[openapi(
    paths(
        integration_hub::api::http_routes::wallet_debit,
        integration_hub::api::http_routes::wallet_credit,
        integration_hub::api::http_routes::incoming_webhook,
        integration_hub::api::http_routes::list_outbox,
        integration_hub::api::http_routes::reconciliation_data,
        integration_hub::api::http_routes::force_replay,
        integration_hub::api::http_routes::clear_db,
    ),
    components(schemas(
        WalletRequest,
        WalletResponse,
        WebhookPayload,
        WebhookAccepted,
        OutboxRecordResponse
    ))
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Integration Hub...");

    let settings = Settings::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&settings.db_url)
        .await?;

    info!("Connected to database");

    let transaction_repo = Arc::new(PostgresTransactionRepository::new(pool.clone()));
    let outbox_repo = Arc::new(PostgresOutboxRepository::new(pool.clone()));
    let idempotency_repo = Arc::new(PostgresIdempotencyRepository::new(pool.clone()));
    let ingress_repo = Arc::new(PostgresIngressRepository::new(pool.clone()));

    let wallet_action_use_case = WalletActionUseCase::new(
        ingress_repo.clone(),
        idempotency_repo.clone(),
        settings.operator_base_url.clone(),
    );
    let incoming_webhook_use_case = IncomingWebhookUseCase::new(
        transaction_repo.clone(),
        ingress_repo.clone(),
        settings.rgs_webhook_url.clone(),
    );
    let reconciliation_use_case = ReconciliationUseCase::new(
        settings.operator_base_url.clone(),
        settings.rgs_webhook_url.clone(),
    );
    let admin_use_case = AdminUseCase::new(outbox_repo.clone());

    let app_state = Arc::new(AppState {
        wallet_action_use_case,
        incoming_webhook_use_case,
        reconciliation_use_case,
        admin_use_case,
        settings: settings.clone(),
        pool: pool.clone(),
    });

    let app = routes(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let dispatch_client = Arc::new(DispatchClient::new(
        settings.rate_limit_per_minute,
        settings.max_retries,
        settings.retry_backoff_seconds,
    ));
    let dispatcher = DispatcherJob::new(outbox_repo.clone(), dispatch_client);

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(2));
        info!("Outbox dispatcher started");
        loop {
            interval.tick().await;
            dispatcher.run_once().await;
        }
    });

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8000".to_string());
    let addr = format!("{host}:{port}");

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
