//! Configuration file loading for the Notary server.
//!
//! The config file is TOML:
//!
//! ```toml
//! db_path = "/var/lib/notary/notary.db"
//! port = 3000
//! pebble_notifications = false
//! log_json = false
//! ```
//!
//! Every key is validated on load; CLI flags may override the result.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Validated server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotaryConfig {
    pub db_path: PathBuf,
    pub port: u16,
    pub pebble_notifications: bool,
    pub log_json: bool,
}

/// Raw shape of the config file before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    db_path: Option<PathBuf>,
    #[serde(default)]
    port: Option<u16>,
    #[serde(default)]
    pebble_notifications: bool,
    #[serde(default)]
    log_json: bool,
}

impl NotaryConfig {
    /// Read and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Validate config file contents.
    pub fn parse(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;

        let db_path = file
            .db_path
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| Error::Config("`db_path` is empty".into()))?;

        let port = file
            .port
            .filter(|p| *p != 0)
            .ok_or_else(|| Error::Config("`port` is empty".into()))?;

        if file.pebble_notifications && find_on_path("pebble").is_none() {
            return Err(Error::Config("pebble binary not found".into()));
        }

        Ok(Self {
            db_path,
            port,
            pebble_notifications: file.pebble_notifications,
            log_json: file.log_json,
        })
    }
}

/// Locate an executable by name in the directories listed in `PATH`.
pub fn find_on_path(binary: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
}
