//! Error types for `Notary` core library.

use thiserror::Error;

/// Result type alias using `Notary` Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for `Notary` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("config file validation failed: {0}")]
    Config(String),

    /// TOML deserialization error
    #[error("config file validation failed: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
