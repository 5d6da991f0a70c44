//! JWT token issuance and validation.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use rand::rngs::OsRng;

use super::claims::Claims;
use crate::storage::User;

/// Lifetime of a session token.
pub const TOKEN_TTL_SECS: i64 = 3600;

/// Length of the signing secret drawn at startup.
pub const SECRET_LEN: usize = 32;

/// Why a presented token was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token")]
    Invalid,
}

/// Manages JWT token creation and validation.
///
/// Tokens are HS256-signed with a secret that lives only as long as the
/// process; restarting the server invalidates every outstanding token.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtManager {
    /// Create a new `JwtManager` with the given secret.
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Create a `JwtManager` with a fresh random secret from the OS.
    pub fn generate() -> Result<Self, rand::Error> {
        let mut secret = [0u8; SECRET_LEN];
        OsRng.try_fill_bytes(&mut secret)?;
        Ok(Self::new(&secret))
    }

    /// Issue a session token for the given user.
    pub fn issue(&self, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_at(user, now_secs())
    }

    /// Issue a session token as if it had been created at `issued_at`.
    pub fn issue_at(
        &self,
        user: &User,
        issued_at: i64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            id: user.id,
            username: user.username.clone(),
            permissions: user.permissions,
            iat: issued_at,
            exp: issued_at + TOKEN_TTL_SECS,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    /// Validate a token and return its claims.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}

fn now_secs() -> i64 {
    #[allow(clippy::cast_possible_wrap)]
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;
    secs
}
