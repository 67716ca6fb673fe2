//! Outbound transport the dispatcher calls to actually deliver an outbox
//! row. One rolling 60-second rate limiter and one retry/backoff loop,
//! shared by both queues (they each get their own `DispatchClient` instance
//! but the same behavior).

use std::sync::Mutex;
use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::warn;

use crate::domain::error::HubError;

/// Non-blocking rolling-window limiter: a full bucket synthesizes a 429
/// rather than making the caller wait. Tracks timestamps in a list and
/// prunes entries older than the 60-second window on each check.
struct RateLimiter {
    window: Mutex<Vec<Instant>>,
    limit_per_minute: u32,
}

impl RateLimiter {
    fn new(limit_per_minute: u32) -> Self {
        Self {
            window: Mutex::new(Vec::new()),
            limit_per_minute,
        }
    }

    fn try_acquire(&self) -> bool {
        let now = Instant::now();
        let mut tokens = self.window.lock().expect("rate limiter mutex poisoned");
        tokens.retain(|t| now.duration_since(*t) < Duration::from_secs(60));
        if tokens.len() >= self.limit_per_minute as usize {
            return false;
        }
        tokens.push(now);
        true
    }
}

/// Result of a single delivery attempt, distinguishing "delivered, downstream
/// accepted or rejected it" from "could not deliver at all".
pub enum DeliveryOutcome {
    Delivered {
        status: u16,
        body: Value,
        /// `Retry-After` value in seconds, set on the synthetic 429 a
        /// rate-limited attempt returns without ever reaching the network.
        retry_after: Option<f64>,
    },
}

pub struct DispatchClient {
    client: Client,
    limiter: RateLimiter,
    max_retries: u32,
    retry_backoff_seconds: f64,
}

impl DispatchClient {
    pub fn new(rate_limit_per_minute: u32, max_retries: u32, retry_backoff_seconds: f64) -> Self {
        Self {
            client: Client::new(),
            limiter: RateLimiter::new(rate_limit_per_minute),
            max_retries,
            retry_backoff_seconds,
        }
    }

    /// POST `payload` to `url`, retrying 429/5xx with doubling backoff up to
    /// `max_retries` times. A network-level failure (DNS, connect, timeout)
    /// maps to `DownstreamUnavailable` immediately; it is not retried here,
    /// the dispatcher's next pass over the still-pending row is the retry.
    pub async fn post_with_retry(&self, url: &str, payload: &Value) -> Result<DeliveryOutcome, HubError> {
        let mut backoff = self.retry_backoff_seconds;
        let mut attempt = 0u32;

        loop {
            if !self.limiter.try_acquire() {
                // Rate limiting is not retried in-line: the caller (the
                // dispatcher) sees a 429 for this attempt and the row is
                // picked up again on the next pass.
                return Ok(DeliveryOutcome::Delivered {
                    status: 429,
                    body: Value::String("rate limited".to_string()),
                    retry_after: Some(60.0),
                });
            }

            let response = match self.client.post(url).json(payload).send().await {
                Ok(resp) => resp,
                Err(err) => {
                    warn!("downstream request error to {}: {}", url, err);
                    return Err(HubError::DownstreamUnavailable(err.to_string()));
                }
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = retry_after_seconds(&response);
                if attempt == self.max_retries {
                    let body = parse_body(response).await;
                    return Ok(DeliveryOutcome::Delivered {
                        status: status.as_u16(),
                        body,
                        retry_after,
                    });
                }
                let wait = retry_after.unwrap_or(backoff);
                tokio::time::sleep(Duration::from_secs_f64(wait)).await;
                attempt += 1;
                backoff *= 2.0;
                continue;
            }

            if status.is_server_error() {
                if attempt == self.max_retries {
                    let body = parse_body(response).await;
                    return Ok(DeliveryOutcome::Delivered {
                        status: status.as_u16(),
                        body,
                        retry_after: None,
                    });
                }
                tokio::time::sleep(Duration::from_secs_f64(backoff)).await;
                attempt += 1;
                backoff *= 2.0;
                continue;
            }

            let body = parse_body(response).await;
            return Ok(DeliveryOutcome::Delivered {
                status: status.as_u16(),
                body,
                retry_after: None,
            });
        }
    }
}

fn retry_after_seconds(response: &reqwest::Response) -> Option<f64> {
    response
        .headers()
        .get("Retry-After")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<f64>().ok())
}

async fn parse_body(response: reqwest::Response) -> Value {
    response.json::<Value>().await.unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn retries_server_errors_then_succeeds() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .mount(&server)
            .await;

        let client = DispatchClient::new(60, 3, 0.01);
        let outcome = client.post_with_retry(&server.uri(), &json!({"amount": 10})).await.unwrap();

        match outcome {
            DeliveryOutcome::Delivered { status, .. } => assert_eq!(status, 200),
        }
    }

    #[tokio::test]
    async fn exhausting_retries_surfaces_the_last_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = DispatchClient::new(60, 1, 0.01);
        let outcome = client.post_with_retry(&server.uri(), &json!({"amount": 10})).await.unwrap();

        match outcome {
            DeliveryOutcome::Delivered { status, retry_after, .. } => {
                assert_eq!(status, 503);
                assert_eq!(retry_after, None);
            }
        }
    }

    #[tokio::test]
    async fn second_call_within_the_window_synthesizes_a_429_with_retry_after() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .mount(&server)
            .await;

        let client = DispatchClient::new(1, 0, 0.01);

        let first = client.post_with_retry(&server.uri(), &json!({"amount": 10})).await.unwrap();
        match first {
            DeliveryOutcome::Delivered { status, .. } => assert_eq!(status, 200),
        }

        let second = client.post_with_retry(&server.uri(), &json!({"amount": 10})).await.unwrap();
        match second {
            DeliveryOutcome::Delivered { status, retry_after, .. } => {
                assert_eq!(status, 429);
                assert_eq!(retry_after, Some(60.0));
            }
        }
    }

    #[test]
    fn rate_limiter_rejects_once_the_per_minute_budget_is_spent() {
        let limiter = RateLimiter::new(1);
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }
}
