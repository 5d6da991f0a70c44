use notary_core::db::DatabaseError;
use notary_pki::ValidationError;

/// Certificate request lifecycle failures.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("invalid certificate request: {0}")]
    InvalidRequest(ValidationError),

    #[error("given csr already recorded")]
    DuplicateRequest,

    #[error("certificate request {0} not found")]
    NotFound(i64),

    #[error("invalid certificate: {0}")]
    InvalidCertificate(ValidationError),

    #[error(transparent)]
    Store(#[from] DatabaseError),
}
