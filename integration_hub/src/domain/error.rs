use thiserror::Error;

/// Unified error taxonomy for the hub. `api::error` maps each variant to
/// the HTTP status it surfaces.
#[derive(Error, Debug)]
pub enum HubError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("timestamp skew")]
    TimestampSkew,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("unsupported currency")]
    UnsupportedCurrency,

    #[error("idempotency conflict")]
    IdempotencyConflict,

    #[error("unknown reference/correlation")]
    UnknownReference,

    #[error("outbox record not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("ledger conflict: {0}")]
    Conflict(String),

    #[error("operator request error: {0}")]
    DownstreamUnavailable(String),

    #[error("downstream rejected ({status}): {body}")]
    DownstreamRejected { status: u16, body: String },

    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for HubError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            // Postgres unique_violation
            if db_err.code().as_deref() == Some("23505") {
                return HubError::Conflict(db_err.message().to_string());
            }
        }
        HubError::Database(err.to_string())
    }
}
