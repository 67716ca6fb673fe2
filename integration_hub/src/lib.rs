//! Integration Hub Library
//!
//! Core of the Integration Hub, exporting the modules the binary and
//! integration tests need.
//!
//! # Modules
//!
//! * `api` - HTTP surface (routes, request/response DTOs, error mapping).
//! * `config` - environment-driven process settings.
//! * `domain` - entities, repository ports and the unified error type.
//! * `infrastructure` - Postgres repositories and the outbound HTTP client.
//! * `jobs` - the background outbox dispatcher.
//! * `security` - bearer-token auth and HMAC request signing.
//! * `use_cases` - application logic for each contracted operation.

pub mod api;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod jobs;
pub mod security;
pub mod use_cases;
