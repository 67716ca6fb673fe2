//! Request/response shapes for the HTTP surface. Field casing matches the
//! wire contract (`camelCase`) regardless of the domain layer's `snake_case`
//! entities.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::entities::{OutboxQueue, OutboxRecord};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletRequest {
    pub player_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub ref_id: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_cents: Option<i64>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub player_id: String,
    pub amount: f64,
    pub currency: String,
    pub status: String,
    pub event: String,
    pub ref_id: String,
    pub correlation_id: Uuid,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WebhookAccepted {
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutboxRecordResponse {
    pub id: i64,
    pub event_type: String,
    pub target_url: String,
    pub status: String,
    pub attempt_count: i32,
    pub next_attempt_at: Option<String>,
    pub last_error: Option<String>,
    pub created_at: String,
    pub payload: serde_json::Value,
    pub queue: &'static str,
}

impl OutboxRecordResponse {
    pub fn from_record(record: OutboxRecord, queue: OutboxQueue) -> Self {
        Self {
            id: record.id,
            event_type: record.event_type,
            target_url: record.target_url,
            status: format!("{:?}", record.status).to_lowercase(),
            attempt_count: record.attempt_count,
            next_attempt_at: Some(record.next_attempt_at.to_rfc3339()),
            last_error: record.last_error,
            created_at: record.created_at.to_rfc3339(),
            payload: record.payload,
            queue: queue.as_str(),
        }
    }
}
