//! Data models for Notary storage.

use serde::{Deserialize, Serialize};

/// Certificate column value marking a request as rejected.
pub const REJECTED_SENTINEL: &str = "rejected";

/// `permissions` value for administrators.
pub const PERMISSIONS_ADMIN: i64 = 1;
/// `permissions` value for standard users.
pub const PERMISSIONS_USER: i64 = 0;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CertificateRequest {
    pub id: i64,
    pub csr: String,
    pub certificate: String,
}

/// Lifecycle state of a certificate request, derived from its certificate column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Outstanding,
    Active,
    Rejected,
}

impl CertificateRequest {
    pub fn status(&self) -> RequestStatus {
        match self.certificate.as_str() {
            "" => RequestStatus::Outstanding,
            REJECTED_SENTINEL => RequestStatus::Rejected,
            _ => RequestStatus::Active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub permissions: i64,
}

impl User {
    pub const fn is_admin(&self) -> bool {
        self.permissions == PERMISSIONS_ADMIN
    }
}
