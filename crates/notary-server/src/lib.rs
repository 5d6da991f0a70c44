//! Notary Server Library
//!
//! Core functionality for the Notary certificate service:
//! - SQLite storage for certificate requests and user accounts
//! - Certificate request lifecycle (submit, attach, reject, detach)
//! - Accounts, password policy, JWT sessions and role checks
//! - "Certificate changed" notifications
//! - HTTP API built on axum
//! - Prometheus metrics (`metrics` feature)

pub mod accounts;
pub mod auth;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod notifications;
pub mod requests;
pub mod server;
pub mod storage;
