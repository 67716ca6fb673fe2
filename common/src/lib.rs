//! Primitive value types and framing-free helpers shared across the
//! Integration Hub.
//!
//! This crate is the "layer (a)" of the three-layer split used to avoid
//! circular imports between domain entities and HTTP-surface shapes:
//! primitive enums and pure functions live here, entities and persistence
//! live in `integration_hub::domain` / `integration_hub::infrastructure`,
//! and request/response shapes live in `integration_hub::api`.

pub mod canonical_json;
pub mod wallet_action;

pub use canonical_json::{canonical_json, request_hash};
pub use wallet_action::WalletAction;
