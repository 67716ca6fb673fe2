use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use common::WalletAction;
use serde::Deserialize;
use sqlx::PgPool;

use crate::api::dto::{OutboxRecordResponse, WalletRequest, WalletResponse, WebhookAccepted, WebhookPayload};
use crate::api::error::ApiError;
use crate::config::Settings;
use crate::domain::entities::OutboxQueue;
use crate::domain::error::HubError;
use crate::infrastructure::persistence::admin;
use crate::security::{auth, signature};
use crate::use_cases::admin::AdminUseCase;
use crate::use_cases::incoming_webhook::{IncomingWebhookPayload, IncomingWebhookUseCase};
use crate::use_cases::reconciliation::ReconciliationUseCase;
use crate::use_cases::wallet_action::{WalletActionRequest, WalletActionUseCase};

pub struct AppState {
    pub wallet_action_use_case: WalletActionUseCase,
    pub incoming_webhook_use_case: IncomingWebhookUseCase,
    pub reconciliation_use_case: ReconciliationUseCase,
    pub admin_use_case: AdminUseCase,
    pub settings: Settings,
    pub pool: PgPool,
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/wallet/debit", post(wallet_debit))
        .route("/wallet/credit", post(wallet_credit))
        .route("/webhooks/incoming", post(incoming_webhook))
        .route("/webhooks/outbox", get(list_outbox))
        .route("/reconciliation_data", get(reconciliation_data))
        .route("/admin/replay/{queue}/{id}", post(force_replay))
        .route("/admin/clear-db", post(clear_db))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

fn bearer_header(headers: &HeaderMap) -> Option<&str> {
    headers.get("authorization").and_then(|v| v.to_str().ok())
}

fn require_bearer(settings: &Settings, headers: &HeaderMap) -> Result<(), HubError> {
    auth::require_bearer_token(settings.bearer_token.as_deref(), bearer_header(headers))
}

/// Validates `X-Signature`/`X-Timestamp` against `body` whenever both
/// headers are present; a request with neither header skips validation
/// entirely (signing is optional on both wallet actions and the incoming
/// webhook). Whether this check runs never depends on server
/// configuration: `HMAC_SECRET` always resolves to a real value.
fn verify_signature_if_present(
    settings: &Settings,
    headers: &HeaderMap,
    body: &serde_json::Value,
) -> Result<(), HubError> {
    let sig = headers.get("x-signature").and_then(|v| v.to_str().ok());
    let ts = headers.get("x-timestamp").and_then(|v| v.to_str().ok());

    match (sig, ts) {
        (None, None) => Ok(()),
        (Some(sig), Some(ts)) => {
            signature::validate_signature(&settings.hmac_secret, body, sig, ts, settings.timestamp_skew_seconds)
        }
        (None, Some(_)) => Err(HubError::InvalidSignature),
        (Some(_), None) => Err(HubError::TimestampSkew),
    }
}

async fn handle_wallet_action(
    state: Arc<AppState>,
    headers: HeaderMap,
    action: WalletAction,
    payload: WalletRequest,
) -> Result<Json<WalletResponse>, ApiError> {
    require_bearer(&state.settings, &headers)?;

    let body = serde_json::json!({
        "playerId": payload.player_id,
        "amountCents": payload.amount_cents,
        "currency": payload.currency,
        "refId": payload.ref_id,
    });
    verify_signature_if_present(&state.settings, &headers, &body)?;

    if !state.settings.currency_allowed(&payload.currency) {
        return Err(HubError::UnsupportedCurrency.into());
    }

    let idempotency_key = headers
        .get("idempotency-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let request = WalletActionRequest {
        player_id: payload.player_id,
        amount_cents: payload.amount_cents,
        currency: payload.currency,
        ref_id: payload.ref_id,
    };

    let result = state
        .wallet_action_use_case
        .execute(action, request, idempotency_key.as_deref())
        .await?;

    Ok(Json(WalletResponse {
        status: result.status,
        ref_id: result.ref_id,
        correlation_id: result.correlation_id,
        balance_cents: result.balance_cents,
        reason: result.reason,
    }))
}

#[utoipa::path(post, path = "/wallet/debit", request_body = WalletRequest, responses((status = 200, body = WalletResponse)))]
pub async fn wallet_debit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<WalletRequest>,
) -> Result<Json<WalletResponse>, ApiError> {
    handle_wallet_action(state, headers, WalletAction::Debit, payload).await
}

#[utoipa::path(post, path = "/wallet/credit", request_body = WalletRequest, responses((status = 200, body = WalletResponse)))]
pub async fn wallet_credit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<WalletRequest>,
) -> Result<Json<WalletResponse>, ApiError> {
    handle_wallet_action(state, headers, WalletAction::Credit, payload).await
}

#[utoipa::path(post, path = "/webhooks/incoming", request_body = WebhookPayload, responses((status = 202, body = WebhookAccepted)))]
pub async fn incoming_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<WebhookPayload>,
) -> Result<Json<WebhookAccepted>, ApiError> {
    let body = serde_json::to_value(&payload).map_err(|e| HubError::Validation(e.to_string()))?;
    verify_signature_if_present(&state.settings, &headers, &body)?;

    state
        .incoming_webhook_use_case
        .execute(IncomingWebhookPayload {
            player_id: payload.player_id,
            amount: payload.amount,
            currency: payload.currency,
            status: payload.status,
            event: payload.event,
            ref_id: payload.ref_id,
            correlation_id: payload.correlation_id,
            balance: payload.balance,
        })
        .await?;

    Ok(Json(WebhookAccepted { status: "accepted" }))
}

#[derive(Debug, Deserialize)]
struct OutboxQuery {
    #[serde(default = "default_queue")]
    queue: String,
    status: Option<String>,
    #[serde(default = "default_limit")]
    limit: i64,
}

fn default_queue() -> String {
    "rgs".to_string()
}

fn default_limit() -> i64 {
    50
}

fn parse_queue(raw: &str) -> Result<OutboxQueue, ApiError> {
    OutboxQueue::from_str_loose(raw)
        .ok_or_else(|| ApiError(HubError::Validation(format!("unknown outbox queue '{raw}'"))))
}

#[utoipa::path(get, path = "/webhooks/outbox", responses((status = 200, body = [OutboxRecordResponse])))]
pub async fn list_outbox(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<OutboxQuery>,
) -> Result<Json<Vec<OutboxRecordResponse>>, ApiError> {
    require_bearer(&state.settings, &headers)?;

    let queue = parse_queue(&query.queue)?;
    let records = state
        .admin_use_case
        .list_outbox(queue, query.status.as_deref(), query.limit)
        .await?;

    Ok(Json(
        records
            .into_iter()
            .map(|r| OutboxRecordResponse::from_record(r, queue))
            .collect(),
    ))
}

#[utoipa::path(get, path = "/reconciliation_data", responses((status = 200, description = "CSV mismatch report")))]
pub async fn reconciliation_data(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    require_bearer(&state.settings, &headers)?;

    let (csv_text, mismatch_count) = state.reconciliation_use_case.generate_csv().await?;

    let mut response_headers = HeaderMap::new();
    response_headers.insert("content-type", "text/csv".parse().unwrap());
    response_headers.insert(
        "content-disposition",
        "attachment; filename=\"reconciliation.csv\"".parse().unwrap(),
    );
    response_headers.insert(
        "x-mismatch-count",
        mismatch_count.to_string().parse().unwrap(),
    );

    Ok((response_headers, csv_text))
}

#[utoipa::path(post, path = "/admin/replay/{queue}/{id}", responses((status = 200, body = OutboxRecordResponse)))]
pub async fn force_replay(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((queue, id)): Path<(String, i64)>,
) -> Result<Json<OutboxRecordResponse>, ApiError> {
    require_bearer(&state.settings, &headers)?;

    let queue = parse_queue(&queue)?;
    let record = state.admin_use_case.force_replay(queue, id).await?;
    Ok(Json(OutboxRecordResponse::from_record(record, queue)))
}

#[utoipa::path(post, path = "/admin/clear-db", responses((status = 200)))]
pub async fn clear_db(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_bearer(&state.settings, &headers)?;

    admin::clear_all_tables(&state.pool).await?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}
