//! Navigation and entity scaffold controllers

mod delete_lifecycle;
mod detail_controller;
mod list_controller;
mod navigation;
mod page_controller;
mod reload_bus;

pub use delete_lifecycle::{DeleteDialog, DeleteLifecycle, DeletePhase};
pub use detail_controller::{DetailController, DetailState};
pub use list_controller::{ListController, ListState};
pub use navigation::{NavigationScope, NavigationStack};
pub use page_controller::{PageController, PageView, PageWatchers};
pub use reload_bus::{ReloadBus, ReloadSubscription, ReloadWatcher};

use std::sync::Arc;

use crate::config::ScaffoldConfig;
use crate::traits::Notifier;
use crate::types::Notification;

/// Result of one `reload()` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// Response stored
    Applied,
    /// A newer reload was issued meanwhile; response discarded
    Stale,
    /// Remote call failed; error recorded on the controller state
    Failed,
}

/// Scaffold context - holds the collaborators every controller shares
///
/// The host creates this once and injects the notifier it renders toasts with.
pub struct ScaffoldContext {
    /// Reload signal bus
    pub reload_bus: ReloadBus,
    /// Toast sink
    pub notifier: Arc<dyn Notifier>,
    /// Configuration
    pub config: ScaffoldConfig,
}

impl ScaffoldContext {
    /// Create a context with a fresh reload bus sized from `config`
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>, config: ScaffoldConfig) -> Self {
        let reload_bus = ReloadBus::new(config.reload_channel_capacity);
        Self::with_bus(notifier, config, reload_bus)
    }

    /// Create a context sharing an existing reload bus
    #[must_use]
    pub fn with_bus(notifier: Arc<dyn Notifier>, config: ScaffoldConfig, reload_bus: ReloadBus) -> Self {
        Self {
            reload_bus,
            notifier,
            config,
        }
    }

    pub(crate) fn notify_success(&self, message: impl Into<String>) {
        if self.config.notify_on_success {
            self.notifier.notify(Notification::success(message));
        }
    }

    pub(crate) fn notify_error(&self, message: impl Into<String>) {
        self.notifier.notify(Notification::error(message));
    }
}
