//! Certificate request lifecycle.
//!
//! A request starts `Outstanding`, becomes `Active` once a matching chain is
//! attached or `Rejected` when refused, and can be cleared back to
//! `Outstanding` from either. Every change to the certificate column fires
//! a notification.

mod error;
mod service;

pub use error::RequestError;
pub use service::CertificateRequestService;
