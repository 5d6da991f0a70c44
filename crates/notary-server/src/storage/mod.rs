//! SQLite storage for the Notary server.
//!
//! Provides persistence for certificate requests and user accounts.
//! Uniqueness of CSR text and usernames, and the bootstrap-admin rule, are
//! enforced here so that concurrent callers cannot race past them.

mod db;
mod models;
mod queries;
mod queries_users;


pub use db::NotaryDatabase;
pub use models::*;
pub use notary_core::db::DatabaseError;
