//! JWT claims structure for Notary session tokens.

use serde::{Deserialize, Serialize};

use crate::storage::PERMISSIONS_ADMIN;

/// JWT claims embedded in session tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub id: i64,
    pub username: String,
    /// `1` for administrators, `0` otherwise.
    pub permissions: i64,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

impl Claims {
    pub const fn is_admin(&self) -> bool {
        self.permissions == PERMISSIONS_ADMIN
    }
}
