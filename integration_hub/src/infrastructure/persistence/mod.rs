pub mod admin;
pub mod idempotency_repository;
pub mod ingress;
pub mod models;
pub mod outbox_repository;
pub mod transaction_repository;
