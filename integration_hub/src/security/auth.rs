//! Bearer-token gate for the hub's authenticated endpoints. A hub with no
//! configured `BEARER_TOKEN` enforces nothing.

use crate::domain::error::HubError;

/// `token == configured`, comparing in constant time so token length/content
/// can't leak through timing.
fn constant_time_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

pub fn require_bearer_token(configured: Option<&str>, header: Option<&str>) -> Result<(), HubError> {
    let Some(configured) = configured else {
        return Ok(());
    };

    let token = header
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(HubError::Unauthorized)?;

    if constant_time_eq(token, configured) {
        Ok(())
    } else {
        Err(HubError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_through_when_unconfigured() {
        assert!(require_bearer_token(None, None).is_ok());
    }

    #[test]
    fn rejects_missing_header_when_configured() {
        assert!(matches!(
            require_bearer_token(Some("secret"), None),
            Err(HubError::Unauthorized)
        ));
    }

    #[test]
    fn rejects_wrong_token() {
        assert!(matches!(
            require_bearer_token(Some("secret"), Some("Bearer wrong")),
            Err(HubError::Unauthorized)
        ));
    }

    #[test]
    fn accepts_matching_token() {
        assert!(require_bearer_token(Some("secret"), Some("Bearer secret")).is_ok());
    }
}
