//! PKCS#10 certificate signing request validation.

use x509_parser::certification_request::X509CertificationRequest;
use x509_parser::pem::Pem;
use x509_parser::prelude::FromDer;

use crate::encoding::{self, CERTIFICATE_REQUEST_LABEL};
use crate::error::ValidationError;

/// Check the block label and parse its contents as a PKCS#10 request.
pub(crate) fn parse_request(block: &Pem) -> Result<X509CertificationRequest<'_>, ValidationError> {
    if block.label != CERTIFICATE_REQUEST_LABEL {
        return Err(ValidationError::WrongPemType {
            expected: CERTIFICATE_REQUEST_LABEL,
            found: block.label.clone(),
        });
    }
    let (rest, request) = X509CertificationRequest::from_der(&block.contents)
        .map_err(|e| ValidationError::Parse(e.to_string()))?;
    if !rest.is_empty() {
        return Err(ValidationError::Parse(
            "trailing data after certificate request".into(),
        ));
    }
    Ok(request)
}

/// Validate a PEM-encoded certificate signing request.
///
/// Only the first PEM block is considered.
pub fn validate_csr(text: &str) -> Result<(), ValidationError> {
    canonical_csr(text).map(|_| ())
}

/// Validate a CSR and return its first block re-encoded as canonical PEM.
pub fn canonical_csr(text: &str) -> Result<String, ValidationError> {
    let block = encoding::decode_first(text)?;
    parse_request(&block)?;
    Ok(encoding::encode_block(&block).trim().to_string())
}
