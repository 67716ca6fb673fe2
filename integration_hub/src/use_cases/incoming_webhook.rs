//! `POST /webhooks/incoming`: Operator callback confirming a wallet movement.

use std::sync::Arc;

use common::WalletAction;
use serde_json::json;
use uuid::Uuid;

use crate::domain::error::HubError;
use crate::domain::repository::{IngressRepository, TransactionRepository};

pub struct IncomingWebhookPayload {
    pub player_id: String,
    pub amount: f64,
    pub currency: String,
    pub status: String,
    pub event: String,
    pub ref_id: String,
    pub correlation_id: Uuid,
    pub balance: f64,
}

pub struct IncomingWebhookUseCase {
    transaction_repo: Arc<dyn TransactionRepository>,
    ingress_repo: Arc<dyn IngressRepository>,
    rgs_webhook_url: String,
}

impl IncomingWebhookUseCase {
    pub fn new(
        transaction_repo: Arc<dyn TransactionRepository>,
        ingress_repo: Arc<dyn IngressRepository>,
        rgs_webhook_url: String,
    ) -> Self {
        Self {
            transaction_repo,
            ingress_repo,
            rgs_webhook_url,
        }
    }

    pub async fn execute(&self, payload: IncomingWebhookPayload) -> Result<(), HubError> {
        self.transaction_repo
            .find_by_ref_and_correlation(&payload.ref_id, payload.correlation_id)
            .await?
            .ok_or(HubError::UnknownReference)?;

        let event = WalletAction::from_operator_verb(&payload.event)
            .map(|action| action.to_string())
            .unwrap_or(payload.event.clone());

        let rgs_payload = json!({
            "playerId": payload.player_id,
            "amountCents": (payload.amount * 100.0).floor() as i64,
            "currency": payload.currency,
            "status": payload.status,
            "event": event,
            "refId": payload.ref_id,
            "correlationId": payload.correlation_id,
            "balanceCents": (payload.balance * 100.0).floor() as i64,
        });

        self.ingress_repo
            .mark_sent_with_rgs_outbox(
                &payload.ref_id,
                payload.correlation_id,
                "incoming_webhook",
                &self.rgs_webhook_url,
                rgs_payload,
            )
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_maps_operator_verb_to_hub_event() {
        assert_eq!(
            WalletAction::from_operator_verb("withdraw").map(|a| a.to_string()),
            Some("debit".to_string())
        );
        assert_eq!(
            WalletAction::from_operator_verb("deposit").map(|a| a.to_string()),
            Some("credit".to_string())
        );
    }
}
