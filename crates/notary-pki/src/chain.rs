//! X.509 certificate chain validation.
//!
//! A chain is an ordered bundle of PEM `CERTIFICATE` blocks, leaf first.
//! Each certificate must be issued and signed by the one that follows it,
//! and every certificate strictly between the leaf and the last one must be
//! a certificate authority.

use x509_parser::certificate::X509Certificate;
use x509_parser::pem::Pem;
use x509_parser::prelude::FromDer;

use crate::encoding::{self, CERTIFICATE_LABEL};
use crate::error::ValidationError;

/// Minimum number of certificates a chain must contain.
pub const MIN_CHAIN_LEN: usize = 2;

fn parse_certificate(block: &Pem) -> Result<X509Certificate<'_>, ValidationError> {
    if block.label != CERTIFICATE_LABEL {
        return Err(ValidationError::NotACertificate);
    }
    let (rest, cert) = X509Certificate::from_der(&block.contents)
        .map_err(|e| ValidationError::Parse(e.to_string()))?;
    if !rest.is_empty() {
        return Err(ValidationError::Parse("trailing data after certificate".into()));
    }
    Ok(cert)
}

/// Parse every block as a certificate and enforce the minimum length.
pub(crate) fn parse_chain(blocks: &[Pem]) -> Result<Vec<X509Certificate<'_>>, ValidationError> {
    let chain = blocks
        .iter()
        .map(parse_certificate)
        .collect::<Result<Vec<_>, _>>()?;
    if chain.len() < MIN_CHAIN_LEN {
        return Err(ValidationError::ChainTooShort { found: chain.len() });
    }
    Ok(chain)
}

/// Check issuer linkage, signatures, and CA flags along a parsed chain.
pub(crate) fn verify_links(chain: &[X509Certificate<'_>]) -> Result<(), ValidationError> {
    for (index, pair) in chain.windows(2).enumerate() {
        let [child, parent] = pair else { continue };
        if child.issuer().as_raw() != parent.subject().as_raw() {
            return Err(ValidationError::SubjectIssuerMismatch { index });
        }
        child
            .verify_signature(Some(parent.public_key()))
            .map_err(|e| ValidationError::SignatureMismatch {
                index,
                reason: e.to_string(),
            })?;
    }

    let intermediates = chain.len().saturating_sub(1);
    for (index, cert) in chain.iter().enumerate().take(intermediates).skip(1) {
        if !cert.is_ca() {
            return Err(ValidationError::NotACertificateAuthority { index });
        }
    }
    Ok(())
}

/// Validate a PEM-encoded certificate chain.
pub fn validate_certificate_chain(text: &str) -> Result<(), ValidationError> {
    let blocks = encoding::decode_all(text);
    let chain = parse_chain(&blocks)?;
    verify_links(&chain)
}

/// Expiry of the leaf certificate of a stored chain, as a Unix timestamp.
pub fn leaf_not_after(text: &str) -> Result<i64, ValidationError> {
    let blocks = encoding::decode_all(text);
    let leaf = blocks.first().ok_or(ValidationError::MalformedPem)?;
    Ok(parse_certificate(leaf)?.validity().not_after.timestamp())
}
