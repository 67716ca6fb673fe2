//! `POST /wallet/{debit|credit}`: initiate a wallet transaction against Operator.

use std::sync::Arc;

use common::{request_hash, WalletAction};
use serde_json::json;
use uuid::Uuid;

use crate::domain::entities::{IdempotencyKey, NewTransaction, TransactionStatus};
use crate::domain::error::HubError;
use crate::domain::repository::{IdempotencyRepository, IngressRepository};

const STARTING_BALANCE_CENTS: i64 = 0;

pub struct WalletActionRequest {
    pub player_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub ref_id: String,
}

pub struct WalletActionResponse {
    pub status: String,
    pub ref_id: Option<String>,
    pub correlation_id: Option<Uuid>,
    pub balance_cents: Option<i64>,
    pub reason: Option<String>,
}

pub struct WalletActionUseCase {
    ingress_repo: Arc<dyn IngressRepository>,
    idempotency_repo: Arc<dyn IdempotencyRepository>,
    operator_base_url: String,
}

impl WalletActionUseCase {
    pub fn new(
        ingress_repo: Arc<dyn IngressRepository>,
        idempotency_repo: Arc<dyn IdempotencyRepository>,
        operator_base_url: String,
    ) -> Self {
        Self {
            ingress_repo,
            idempotency_repo,
            operator_base_url,
        }
    }

    /// Bearer auth, currency allowlisting and HMAC signature validation
    /// happen in the HTTP handler before this is called. This covers
    /// idempotency lookup, the blocked-player business rule, the outbox +
    /// ledger insert, and the optimistic response.
    pub async fn execute(
        &self,
        action: WalletAction,
        request: WalletActionRequest,
        idempotency_key: Option<&str>,
    ) -> Result<WalletActionResponse, HubError> {
        let body = json!({
            "playerId": request.player_id,
            "amountCents": request.amount_cents,
            "currency": request.currency,
            "refId": request.ref_id,
        });
        let body_hash = request_hash(&body);

        if let Some(key) = idempotency_key {
            if let Some(existing) = self.idempotency_repo.find(key).await? {
                if existing.request_hash != body_hash {
                    return Err(HubError::IdempotencyConflict);
                }
                return Ok(response_from_stored(existing));
            }
        }

        if is_blocked_player(&request.player_id) {
            return Ok(WalletActionResponse {
                status: "REJECTED".to_string(),
                ref_id: None,
                correlation_id: None,
                balance_cents: None,
                reason: Some("User Account Is Blocked".to_string()),
            });
        }

        let correlation_id = Uuid::new_v4();
        let external_player_id = resolve_external_player_id(&request.player_id);
        let operator_verb = action.operator_verb();
        let target_url = format!(
            "{}/v2/players/{}/{}",
            self.operator_base_url.trim_end_matches('/'),
            external_player_id,
            operator_verb
        );

        let operator_payload = json!({
            "amount": request.amount_cents as f64 / 100.0,
            "currency": request.currency,
            "reference": request.ref_id,
            "correlationId": correlation_id,
        });

        let new_transaction = NewTransaction {
            ref_id: request.ref_id.clone(),
            player_id: request.player_id.clone(),
            amount_cents: request.amount_cents,
            currency: request.currency.clone(),
            direction: action,
            status: TransactionStatus::Initiated,
            balance_cents: None,
            correlation_id,
        };

        self.ingress_repo
            .insert_with_operator_outbox(
                new_transaction,
                "wallet_action",
                &target_url,
                operator_payload,
            )
            .await?;

        let balance = match action {
            WalletAction::Debit => STARTING_BALANCE_CENTS - request.amount_cents,
            WalletAction::Credit => STARTING_BALANCE_CENTS + request.amount_cents,
        };

        let response = WalletActionResponse {
            status: "initiated".to_string(),
            ref_id: Some(request.ref_id),
            correlation_id: Some(correlation_id),
            balance_cents: Some(balance),
            reason: None,
        };

        if let Some(key) = idempotency_key {
            self.idempotency_repo
                .store(key, &body_hash, response_to_json(&response))
                .await?;
        }

        Ok(response)
    }
}

/// Business rejection rule; implementation-defined predicate, following the
/// `_bad`-suffix convention for a blocked player.
fn is_blocked_player(player_id: &str) -> bool {
    player_id.ends_with("_bad")
}

/// Pluggable external-id mapping; default is identity with a suffix.
fn resolve_external_player_id(player_id: &str) -> String {
    format!("{player_id}_ext")
}

fn response_to_json(response: &WalletActionResponse) -> serde_json::Value {
    json!({
        "status": response.status,
        "refId": response.ref_id,
        "correlationId": response.correlation_id,
        "balanceCents": response.balance_cents,
        "reason": response.reason,
    })
}

fn response_from_stored(stored: IdempotencyKey) -> WalletActionResponse {
    let body = stored.response_body;
    WalletActionResponse {
        status: body
            .get("status")
            .and_then(|v| v.as_str())
            .unwrap_or("initiated")
            .to_string(),
        ref_id: body
            .get("refId")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        correlation_id: body
            .get("correlationId")
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok()),
        balance_cents: body.get("balanceCents").and_then(|v| v.as_i64()),
        reason: body
            .get("reason")
            .and_then(|v| v.as_str())
            .map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_predicate_matches_bad_suffix() {
        assert!(is_blocked_player("p1_bad"));
        assert!(!is_blocked_player("p1"));
    }

    #[test]
    fn external_player_id_appends_suffix() {
        assert_eq!(resolve_external_player_id("p1"), "p1_ext");
    }
}
