//! Notification sink trait

use crate::types::Notification;

/// Receives one-shot user-visible notifications (toasts).
///
/// Platform implementation: the host's toast layer. `NoopNotifier` drops everything.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Notifier that discards notifications
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notification: Notification) {}
}
