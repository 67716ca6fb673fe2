//! Reconciliation CSV: pull RGS's own record of what it received and
//! Operator's own record of what it processed, diff by `correlationId`.

use std::collections::HashMap;

use reqwest::Client;
use serde_json::Value;

use crate::domain::error::HubError;

pub struct ReconciliationUseCase {
    client: Client,
    operator_base_url: String,
    rgs_webhook_url: String,
}

impl ReconciliationUseCase {
    pub fn new(operator_base_url: String, rgs_webhook_url: String) -> Self {
        Self {
            client: Client::new(),
            operator_base_url,
            rgs_webhook_url,
        }
    }

    pub async fn generate_csv(&self) -> Result<(String, usize), HubError> {
        let local_items = self.fetch_items(&self.rgs_webhook_url).await?;
        let remote_url = format!(
            "{}/v2/transactions",
            self.operator_base_url.trim_end_matches('/')
        );
        let remote_items = self.fetch_items(&remote_url).await?;

        let local_by_correlation = index_by_correlation_id(local_items);
        let remote_by_correlation = index_by_correlation_id(remote_items);

        let mut mismatches: Vec<[String; 6]> = Vec::new();

        for (correlation_id, local) in &local_by_correlation {
            if !remote_by_correlation.contains_key(correlation_id) {
                mismatches.push([
                    local.get("refId").and_then(Value::as_str).unwrap_or_default().to_string(),
                    correlation_id.clone(),
                    local.get("event").and_then(Value::as_str).unwrap_or_default().to_string(),
                    format_amount(
                        local.get("amountCents").and_then(Value::as_f64).unwrap_or(0.0) / 100.0
                    ),
                    "True".to_string(),
                    "False".to_string(),
                ]);
            }
        }

        for (correlation_id, remote) in &remote_by_correlation {
            if !local_by_correlation.contains_key(correlation_id) {
                mismatches.push([
                    remote.get("reference").and_then(Value::as_str).unwrap_or_default().to_string(),
                    correlation_id.clone(),
                    remote.get("direction").and_then(Value::as_str).unwrap_or_default().to_string(),
                    format_amount(remote.get("amount").and_then(Value::as_f64).unwrap_or(0.0)),
                    "False".to_string(),
                    "True".to_string(),
                ]);
            }
        }

        let mismatch_count = mismatches.len();

        let mut writer = csv::WriterBuilder::new().from_writer(vec![]);
        writer
            .write_record(["refId", "correlationId", "direction", "amount", "inRGS", "inOperator"])
            .map_err(|e| HubError::Validation(e.to_string()))?;
        for row in &mismatches {
            writer
                .write_record(row)
                .map_err(|e| HubError::Validation(e.to_string()))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| HubError::Validation(e.to_string()))?;
        let csv_text = String::from_utf8(bytes).map_err(|e| HubError::Validation(e.to_string()))?;

        Ok((csv_text, mismatch_count))
    }

    async fn fetch_items(&self, url: &str) -> Result<Vec<Value>, HubError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HubError::DownstreamUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(HubError::DownstreamRejected {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| HubError::DownstreamUnavailable(e.to_string()))
    }
}

/// Renders like Python's `str(float)`: always at least one decimal digit,
/// full precision otherwise, so `10.0` stays `10.0` and `10.55` stays `10.55`.
fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

fn index_by_correlation_id(items: Vec<Value>) -> HashMap<String, Value> {
    items
        .into_iter()
        .filter_map(|item| {
            item.get("correlationId")
                .and_then(Value::as_str)
                .map(|id| (id.to_string(), item.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn indexes_items_dropping_entries_without_correlation_id() {
        let items = vec![json!({"correlationId": "a"}), json!({"noId": true})];
        let indexed = index_by_correlation_id(items);
        assert_eq!(indexed.len(), 1);
        assert!(indexed.contains_key("a"));
    }

    #[test]
    fn formats_whole_and_fractional_amounts_like_python_str_float() {
        assert_eq!(format_amount(10.0), "10.0");
        assert_eq!(format_amount(0.0), "0.0");
        assert_eq!(format_amount(10.55), "10.55");
    }

    #[test]
    fn mismatch_rows_use_capitalized_booleans_and_decimal_amounts() {
        let local = vec![json!({
            "refId": "ref-local",
            "correlationId": "corr-1",
            "event": "credit",
            "amountCents": 1000.0,
        })];
        let remote = vec![json!({
            "reference": "ref-remote",
            "correlationId": "corr-2",
            "direction": "deposit",
            "amount": 10.0,
        })];

        let local_by_correlation = index_by_correlation_id(local);
        let remote_by_correlation = index_by_correlation_id(remote);

        let mut rows: Vec<[String; 6]> = Vec::new();
        for (correlation_id, item) in &local_by_correlation {
            if !remote_by_correlation.contains_key(correlation_id) {
                rows.push([
                    item.get("refId").and_then(Value::as_str).unwrap_or_default().to_string(),
                    correlation_id.clone(),
                    item.get("event").and_then(Value::as_str).unwrap_or_default().to_string(),
                    format_amount(item.get("amountCents").and_then(Value::as_f64).unwrap_or(0.0) / 100.0),
                    "True".to_string(),
                    "False".to_string(),
                ]);
            }
        }
        for (correlation_id, item) in &remote_by_correlation {
            if !local_by_correlation.contains_key(correlation_id) {
                rows.push([
                    item.get("reference").and_then(Value::as_str).unwrap_or_default().to_string(),
                    correlation_id.clone(),
                    item.get("direction").and_then(Value::as_str).unwrap_or_default().to_string(),
                    format_amount(item.get("amount").and_then(Value::as_f64).unwrap_or(0.0)),
                    "False".to_string(),
                    "True".to_string(),
                ]);
            }
        }

        assert!(rows.contains(&[
            "ref-local".to_string(), "corr-1".to_string(), "credit".to_string(),
            "10.0".to_string(), "True".to_string(), "False".to_string(),
        ]));
        assert!(rows.contains(&[
            "ref-remote".to_string(), "corr-2".to_string(), "deposit".to_string(),
            "10.0".to_string(), "False".to_string(), "True".to_string(),
        ]));
    }
}
