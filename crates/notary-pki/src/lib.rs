//! `Notary` PKI validation
//!
//! Pure functions that decide whether submitted PEM text is acceptable:
//!
//! - **CSR**: one `CERTIFICATE REQUEST` block holding a PKCS#10 structure
//! - **Chain**: two or more `CERTIFICATE` blocks, leaf first, each issued and
//!   signed by the next, with every intermediate marked as a CA
//! - **Match**: the leaf certificate carries the same public key as the CSR
//!
//! Nothing here touches storage or the network.

pub mod chain;
pub mod csr;
pub mod error;
pub mod encoding;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use chain::{leaf_not_after, validate_certificate_chain};
pub use csr::{canonical_csr, validate_csr};
pub use error::ValidationError;
pub use encoding::sanitize_pem_bundle;

/// Check that `cert` is a valid chain whose leaf was issued for `csr`.
///
/// Both inputs are validated first and their specific failures are returned
/// as-is; only then are the public keys compared.
pub fn certificate_matches_csr(cert: &str, csr: &str) -> Result<(), ValidationError> {
    let csr_block = encoding::decode_first(csr)?;
    let request = csr::parse_request(&csr_block)?;

    let cert_blocks = encoding::decode_all(cert);
    let chain = chain::parse_chain(&cert_blocks)?;
    chain::verify_links(&chain)?;

    let leaf = chain.first().ok_or(ValidationError::ChainTooShort { found: 0 })?;
    if leaf.public_key().raw != request.certification_request_info.subject_pki.raw {
        return Err(ValidationError::KeyMismatch);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{TestAuthority, TestRequest, join_chain};

    #[test]
    fn matching_certificate_is_accepted() {
        let root = TestAuthority::root("Match Root");
        let request = TestRequest::new("example.com");
        let chain = join_chain(&[&root.issue(&request), &root.cert_pem]);

        certificate_matches_csr(&chain, &request.csr_pem).unwrap();
    }

    #[test]
    fn unrelated_csr_is_key_mismatch() {
        let root = TestAuthority::root("Match Root");
        let issued_for = TestRequest::new("example.com");
        let other = TestRequest::new("example.com");
        let chain = join_chain(&[&root.issue(&issued_for), &root.cert_pem]);

        let err = certificate_matches_csr(&chain, &other.csr_pem).unwrap_err();
        assert_eq!(err, ValidationError::KeyMismatch);
    }

    #[test]
    fn csr_errors_are_reported_before_chain_errors() {
        let err = certificate_matches_csr("garbage", "also garbage").unwrap_err();
        assert_eq!(err, ValidationError::MalformedPem);
    }

    #[test]
    fn chain_errors_are_reported_before_key_comparison() {
        let root = TestAuthority::root("Match Root");
        let request = TestRequest::new("example.com");

        let err = certificate_matches_csr(&root.issue(&request), &request.csr_pem).unwrap_err();
        assert_eq!(err, ValidationError::ChainTooShort { found: 1 });
    }

    #[test]
    fn matching_through_intermediate() {
        let root = TestAuthority::root("Match Root");
        let intermediate = root.subordinate("Match Intermediate", true);
        let request = TestRequest::new("svc.example.com");
        let chain = join_chain(&[
            &intermediate.issue(&request),
            &intermediate.cert_pem,
            &root.cert_pem,
        ]);

        certificate_matches_csr(&chain, &request.csr_pem).unwrap();
    }
}
