//! Delivery through `pebble notify`.

use std::path::PathBuf;

use tracing::{debug, warn};

use super::{CERTIFICATE_UPDATE_TOPIC, CertificateNotifier, NotificationError};

/// Runs `pebble notify <topic> request_id=<id>` for every change.
#[derive(Debug, Clone)]
pub struct PebbleNotifier {
    binary: PathBuf,
}

impl Default for PebbleNotifier {
    fn default() -> Self {
        Self::with_binary("pebble")
    }
}

impl PebbleNotifier {
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Run the notify command once and wait for it to finish.
    pub async fn notify(&self, request_id: i64) -> Result<(), NotificationError> {
        let output = tokio::process::Command::new(&self.binary)
            .args(["notify", CERTIFICATE_UPDATE_TOPIC])
            .arg(format!("request_id={request_id}"))
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(NotificationError::Failed {
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        debug!(request_id, "pebble notify sent");
        Ok(())
    }
}

impl CertificateNotifier for PebbleNotifier {
    fn certificate_changed(&self, request_id: i64) {
        let notifier = self.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.notify(request_id).await {
                warn!(request_id, error = %e, "pebble notify failed, continuing");
            }
        });
    }
}
