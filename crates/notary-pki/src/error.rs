//! Validation error types.

/// Why a CSR, certificate chain, or CSR/certificate pairing was refused.
///
/// Variants are ordered by the layer that detects them: PEM syntax, PEM
/// type, DER structure, chain relationships, key correspondence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("PEM string not found or malformed")]
    MalformedPem,

    #[error("PEM block is {found:?}, expected {expected:?}")]
    WrongPemType {
        expected: &'static str,
        found: String,
    },

    #[error("failed to parse DER structure: {0}")]
    Parse(String),

    #[error("a given PEM block was not a certificate")]
    NotACertificate,

    #[error("less than 2 certificate PEM blocks were found (got {found})")]
    ChainTooShort { found: usize },

    #[error("invalid certificate chain: certificate {index}, certificate {next}: subjects do not match", next = .index + 1)]
    SubjectIssuerMismatch { index: usize },

    #[error("invalid certificate chain: certificate {index}, certificate {next}: keys do not match: {reason}", next = .index + 1)]
    SignatureMismatch { index: usize, reason: String },

    #[error("invalid certificate chain: certificate {index} is not a certificate authority")]
    NotACertificateAuthority { index: usize },

    #[error("certificate does not match CSR")]
    KeyMismatch,
}
