use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::error::HubError;

/// Maps `HubError` to the HTTP status taxonomy the hub surfaces.
pub struct ApiError(pub HubError);

impl From<HubError> for ApiError {
    fn from(err: HubError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            HubError::InvalidSignature | HubError::TimestampSkew | HubError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, self.0.to_string())
            }
            HubError::UnsupportedCurrency => (StatusCode::UNPROCESSABLE_ENTITY, self.0.to_string()),
            HubError::IdempotencyConflict | HubError::Conflict(_) => {
                (StatusCode::CONFLICT, self.0.to_string())
            }
            HubError::UnknownReference | HubError::NotFound => {
                (StatusCode::NOT_FOUND, self.0.to_string())
            }
            HubError::Validation(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            HubError::DownstreamUnavailable(ref e) => {
                tracing::error!("downstream unavailable: {}", e);
                (StatusCode::BAD_GATEWAY, "downstream unavailable".to_string())
            }
            HubError::DownstreamRejected { status, body } => {
                let code = StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY);
                (code, body.clone())
            }
            HubError::Database(ref e) => {
                tracing::error!("database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
        };

        let body = Json(json!({
            "status": "error",
            "message": message,
        }));
        (status, body).into_response()
    }
}
