//! Certificate request queries.

use super::db::NotaryDatabase;
use super::models::CertificateRequest;
use notary_core::db::DatabaseError;

impl NotaryDatabase {
    /// Insert a new outstanding request and return its id.
    ///
    /// Fails with `Duplicate` if an identical CSR is already stored.
    pub async fn create_certificate_request(&self, csr: &str) -> Result<i64, DatabaseError> {
        let result = sqlx::query("INSERT INTO certificate_requests (csr) VALUES (?)")
            .bind(csr)
            .execute(self.pool())
            .await?;

        Ok(result.last_insert_rowid())
    }

    /// List all requests in insertion order.
    pub async fn list_certificate_requests(&self) -> Result<Vec<CertificateRequest>, DatabaseError> {
        let rows = sqlx::query_as::<_, CertificateRequest>(
            "SELECT id, csr, certificate FROM certificate_requests ORDER BY id",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    pub async fn get_certificate_request(&self, id: i64) -> Result<CertificateRequest, DatabaseError> {
        sqlx::query_as::<_, CertificateRequest>(
            "SELECT id, csr, certificate FROM certificate_requests WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("Certificate request {id}")))
    }

    /// Overwrite the certificate column of a request.
    ///
    /// An empty string resets the request to outstanding.
    pub async fn update_certificate(&self, id: i64, certificate: &str) -> Result<i64, DatabaseError> {
        let result = sqlx::query("UPDATE certificate_requests SET certificate = ? WHERE id = ?")
            .bind(certificate)
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Certificate request {id}")));
        }
        Ok(id)
    }

    pub async fn delete_certificate_request(&self, id: i64) -> Result<i64, DatabaseError> {
        let result = sqlx::query("DELETE FROM certificate_requests WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Certificate request {id}")));
        }
        Ok(id)
    }
}
