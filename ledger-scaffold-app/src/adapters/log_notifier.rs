//! Notifier that writes toasts to the `log` facade.

use chrono::SecondsFormat;
use ledger_scaffold_core::traits::Notifier;
use ledger_scaffold_core::types::{Notification, NotificationKind};

/// Routes notifications to `log` under the `toast` target.
///
/// Errors log at `warn`: the failure itself was already logged by the
/// controller at the level its error class calls for.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        let at = notification
            .created_at
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        match notification.kind {
            NotificationKind::Success | NotificationKind::Info => {
                log::info!(target: "toast", "[{at}] {}", notification.message);
            }
            NotificationKind::Error => {
                log::warn!(target: "toast", "[{at}] {}", notification.message);
            }
        }
    }
}
