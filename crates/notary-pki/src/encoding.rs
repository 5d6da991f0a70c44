//! PEM block decoding and canonical re-encoding.

use ::pem::{EncodeConfig, LineEnding};
use x509_parser::pem::Pem;

use crate::error::ValidationError;

pub const CERTIFICATE_LABEL: &str = "CERTIFICATE";
pub const CERTIFICATE_REQUEST_LABEL: &str = "CERTIFICATE REQUEST";

/// Decode the first PEM block in `text`.
pub(crate) fn decode_first(text: &str) -> Result<Pem, ValidationError> {
    match Pem::iter_from_buffer(text.as_bytes()).next() {
        Some(Ok(block)) => Ok(block),
        Some(Err(_)) | None => Err(ValidationError::MalformedPem),
    }
}

/// Decode consecutive PEM blocks until one fails to decode.
///
/// Anything after the first undecodable block is ignored.
pub(crate) fn decode_all(text: &str) -> Vec<Pem> {
    Pem::iter_from_buffer(text.as_bytes())
        .map_while(Result::ok)
        .collect()
}

/// Re-encode a single block as PEM with LF line endings.
pub(crate) fn encode_block(block: &Pem) -> String {
    let encoded = ::pem::Pem::new(block.label.clone(), block.contents.clone());
    ::pem::encode_config(
        &encoded,
        EncodeConfig::new().set_line_ending(LineEnding::LF),
    )
}

/// Format a PEM bundle canonically.
///
/// Every decodable block is re-encoded; blocks are separated by exactly one
/// newline and the result has no leading or trailing whitespace.
pub fn sanitize_pem_bundle(text: &str) -> String {
    decode_all(text)
        .iter()
        .map(encode_block)
        .collect::<String>()
        .trim()
        .to_string()
}
