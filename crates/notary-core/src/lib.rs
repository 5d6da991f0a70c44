//! `Notary` Core Library
//!
//! Shared functionality for `Notary` components:
//! - `SQLite` pool helpers and the database error taxonomy
//! - Configuration file loading and validation
//! - Tracing initialisation
//! - Common error types

pub mod config;
pub mod db;
pub mod error;
pub mod tracing_init;

pub use config::NotaryConfig;
pub use error::{Error, Result};
