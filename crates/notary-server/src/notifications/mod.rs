//! "Certificate changed" notifications.
//!
//! The lifecycle only decides that a notification should fire. Delivery is
//! fire-and-forget: failures are logged and never reach the API caller.

mod pebble;

pub use pebble::PebbleNotifier;

/// Topic announced whenever a request's certificate column changes.
pub const CERTIFICATE_UPDATE_TOPIC: &str = "canonical.com/notary/certificate/update";

/// Errors that can occur while delivering a notification.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("failed to spawn notifier: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("notifier exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
}

/// Receives "certificate changed" signals from the request lifecycle.
///
/// Implementations must return promptly; slow delivery belongs on a
/// spawned task.
pub trait CertificateNotifier: Send + Sync {
    fn certificate_changed(&self, request_id: i64);
}

/// Notifier used when notifications are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl CertificateNotifier for NoopNotifier {
    fn certificate_changed(&self, _request_id: i64) {}
}
