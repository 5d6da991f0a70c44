//! Lifecycle operations over the credential store.

use std::sync::Arc;

use tracing::{info, instrument};

use super::error::RequestError;
use crate::notifications::CertificateNotifier;
use crate::storage::{CertificateRequest, DatabaseError, NotaryDatabase, REJECTED_SENTINEL};

#[derive(Clone)]
pub struct CertificateRequestService {
    db: NotaryDatabase,
    notifier: Arc<dyn CertificateNotifier>,
}

fn not_found_or_store(id: i64) -> impl FnOnce(DatabaseError) -> RequestError {
    move |e| {
        if e.is_not_found() {
            RequestError::NotFound(id)
        } else {
            RequestError::Store(e)
        }
    }
}

impl CertificateRequestService {
    pub fn new(db: NotaryDatabase, notifier: Arc<dyn CertificateNotifier>) -> Self {
        Self { db, notifier }
    }

    /// Validate and store a new CSR, returning its id.
    ///
    /// The CSR is stored in canonical PEM form, so resubmitting the same
    /// request with different whitespace is still a duplicate.
    #[instrument(skip(self, csr))]
    pub async fn submit(&self, csr: &str) -> Result<i64, RequestError> {
        let canonical = notary_pki::canonical_csr(csr).map_err(RequestError::InvalidRequest)?;

        let id = self
            .db
            .create_certificate_request(&canonical)
            .await
            .map_err(|e| {
                if e.is_duplicate() {
                    RequestError::DuplicateRequest
                } else {
                    RequestError::Store(e)
                }
            })?;

        info!(request_id = id, "Certificate request submitted");
        Ok(id)
    }

    pub async fn list(&self) -> Result<Vec<CertificateRequest>, RequestError> {
        Ok(self.db.list_certificate_requests().await?)
    }

    pub async fn get(&self, id: i64) -> Result<CertificateRequest, RequestError> {
        self.db
            .get_certificate_request(id)
            .await
            .map_err(not_found_or_store(id))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<i64, RequestError> {
        let id = self
            .db
            .delete_certificate_request(id)
            .await
            .map_err(not_found_or_store(id))?;
        info!(request_id = id, "Certificate request deleted");
        Ok(id)
    }

    /// Attach a certificate chain issued for the request's CSR.
    ///
    /// The chain must validate and its leaf must carry the CSR's public key.
    /// On success it is stored in canonical form and the request is `Active`.
    #[instrument(skip(self, certificate))]
    pub async fn attach_certificate(&self, id: i64, certificate: &str) -> Result<i64, RequestError> {
        let request = self.get(id).await?;
        notary_pki::certificate_matches_csr(certificate, &request.csr)
            .map_err(RequestError::InvalidCertificate)?;

        let sanitized = notary_pki::sanitize_pem_bundle(certificate);
        self.set_certificate(id, &sanitized).await?;
        info!(request_id = id, "Certificate attached");
        Ok(id)
    }

    /// Mark the request as rejected, replacing any attached certificate.
    #[instrument(skip(self))]
    pub async fn reject(&self, id: i64) -> Result<i64, RequestError> {
        self.set_certificate(id, REJECTED_SENTINEL).await?;
        info!(request_id = id, "Certificate request rejected");
        Ok(id)
    }

    /// Clear the certificate or rejection, returning the request to `Outstanding`.
    #[instrument(skip(self))]
    pub async fn detach_certificate(&self, id: i64) -> Result<i64, RequestError> {
        self.set_certificate(id, "").await?;
        info!(request_id = id, "Certificate detached");
        Ok(id)
    }

    async fn set_certificate(&self, id: i64, value: &str) -> Result<(), RequestError> {
        self.db
            .update_certificate(id, value)
            .await
            .map_err(not_found_or_store(id))?;
        self.notifier.certificate_changed(id);
        Ok(())
    }
}
