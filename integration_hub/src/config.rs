use std::env;

/// Process configuration, loaded once at startup from the environment
/// (via `.env` when present, with `dotenvy::dotenv()` called from `main.rs`).
#[derive(Debug, Clone)]
pub struct Settings {
    pub operator_base_url: String,
    pub rgs_webhook_url: String,
    pub hmac_secret: String,
    pub bearer_token: Option<String>,
    pub db_url: String,
    pub max_retries: u32,
    pub retry_backoff_seconds: f64,
    pub rate_limit_per_minute: u32,
    pub timestamp_skew_seconds: i64,
    pub supported_currencies: Vec<String>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            operator_base_url: env::var("OPERATOR_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8001".to_string()),
            rgs_webhook_url: env::var("RGS_WEBHOOK_URL")
                .unwrap_or_else(|_| "http://localhost:8002/webhooks".to_string()),
            hmac_secret: env::var("HMAC_SECRET")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "changeme".to_string()),
            bearer_token: env::var("BEARER_TOKEN").ok().filter(|s| !s.is_empty()),
            db_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            max_retries: parse_or_default("MAX_RETRIES", 3),
            retry_backoff_seconds: parse_or_default("RETRY_BACKOFF_SECONDS", 1.0),
            rate_limit_per_minute: parse_or_default("RATE_LIMIT_PER_MINUTE", 60),
            timestamp_skew_seconds: parse_or_default("TIMESTAMP_SKEW_SECONDS", 5),
            supported_currencies: env::var("SUPPORTED_CURRENCIES")
                .map(|raw| raw.split(',').map(|s| s.trim().to_uppercase()).collect())
                .unwrap_or_else(|_| vec!["USD".to_string(), "EUR".to_string()]),
        }
    }

    pub fn currency_allowed(&self, currency: &str) -> bool {
        self.supported_currencies
            .iter()
            .any(|c| c.eq_ignore_ascii_case(currency))
    }
}

fn parse_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_allowlist_is_case_insensitive() {
        let settings = Settings {
            operator_base_url: String::new(),
            rgs_webhook_url: String::new(),
            hmac_secret: "changeme".to_string(),
            bearer_token: None,
            db_url: String::new(),
            max_retries: 3,
            retry_backoff_seconds: 1.0,
            rate_limit_per_minute: 60,
            timestamp_skew_seconds: 5,
            supported_currencies: vec!["USD".to_string(), "EUR".to_string()],
        };
        assert!(settings.currency_allowed("usd"));
        assert!(settings.currency_allowed("EUR"));
        assert!(!settings.currency_allowed("TRY"));
    }
}
