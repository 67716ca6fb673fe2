//! HMAC-SHA-256 request signing: `hmac(secret, "{timestamp}:{canonical_body}")`.

use chrono::Utc;
use common::canonical_json;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::domain::error::HubError;

type HmacSha256 = Hmac<Sha256>;

fn mac_for(secret: &str, body: &serde_json::Value, timestamp: &str) -> HmacSha256 {
    let message = format!("{}:{}", timestamp, canonical_json(body));
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(message.as_bytes());
    mac
}

pub fn compute_signature(secret: &str, body: &serde_json::Value, timestamp: &str) -> String {
    hex::encode(mac_for(secret, body, timestamp).finalize().into_bytes())
}

/// Validates `x_signature`/`x_timestamp` against `body`. Timestamp skew is
/// checked before the signature so a stale-but-correctly-signed request
/// still gets `TimestampSkew`. The signature compare itself is
/// constant-time via `Mac::verify_slice`.
pub fn validate_signature(
    secret: &str,
    body: &serde_json::Value,
    signature: &str,
    timestamp: &str,
    skew_seconds: i64,
) -> Result<(), HubError> {
    let now = Utc::now().timestamp();
    let ts: i64 = timestamp.parse().map_err(|_| HubError::TimestampSkew)?;
    if (now - ts).abs() > skew_seconds {
        return Err(HubError::TimestampSkew);
    }

    let sig_bytes = hex::decode(signature).map_err(|_| HubError::InvalidSignature)?;
    mac_for(secret, body, timestamp)
        .verify_slice(&sig_bytes)
        .map_err(|_| HubError::InvalidSignature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_trips_through_compute_and_validate() {
        let body = json!({"b": 1, "a": 2});
        let ts = Utc::now().timestamp().to_string();
        let sig = compute_signature("secret", &body, &ts);
        assert!(validate_signature("secret", &body, &sig, &ts, 5).is_ok());
    }

    #[test]
    fn rejects_tampered_body() {
        let body = json!({"amount": 100});
        let ts = Utc::now().timestamp().to_string();
        let sig = compute_signature("secret", &body, &ts);
        let tampered = json!({"amount": 101});
        assert!(matches!(
            validate_signature("secret", &tampered, &sig, &ts, 5),
            Err(HubError::InvalidSignature)
        ));
    }

    #[test]
    fn rejects_stale_timestamp() {
        let body = json!({"amount": 100});
        let old_ts = (Utc::now().timestamp() - 3600).to_string();
        let sig = compute_signature("secret", &body, &old_ts);
        assert!(matches!(
            validate_signature("secret", &body, &sig, &old_ts, 5),
            Err(HubError::TimestampSkew)
        ));
    }

    #[test]
    fn signature_is_order_independent_over_keys() {
        let a = json!({"a": 1, "b": 2});
        let b = json!({"b": 2, "a": 1});
        let ts = "1700000000";
        assert_eq!(compute_signature("k", &a, ts), compute_signature("k", &b, ts));
    }
}
