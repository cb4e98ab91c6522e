//! Application bootstrap for the ledger scaffold controllers.
//!
//! Provides `ScaffoldApp` (shared context plus controller factories) and
//! `ScaffoldAppBuilder` (adapter injection).

pub mod adapters;

use std::path::Path;
use std::sync::Arc;

use ledger_scaffold_core::config::ScaffoldConfig;
use ledger_scaffold_core::error::ScaffoldResult;
use ledger_scaffold_core::services::{
    DetailController, ListController, NavigationScope, PageController, PageWatchers, ReloadBus,
    ScaffoldContext,
};
use ledger_scaffold_core::traits::{EntityContract, Notifier};
use ledger_scaffold_core::types::{Entity, EntityType};

use crate::adapters::LogNotifier;

/// Application state.
///
/// Built once at startup; every screen asks it for controllers so they all
/// share one notifier, one config and one reload bus.
pub struct ScaffoldApp {
    /// Shared controller context
    pub ctx: Arc<ScaffoldContext>,
}

impl ScaffoldApp {
    #[must_use]
    pub fn builder() -> ScaffoldAppBuilder {
        ScaffoldAppBuilder::new()
    }

    pub fn config(&self) -> &ScaffoldConfig {
        &self.ctx.config
    }

    pub fn reload_bus(&self) -> &ReloadBus {
        &self.ctx.reload_bus
    }

    /// Invalidate every mounted list/detail of `entity_type`.
    pub fn publish_reload(&self, entity_type: EntityType) -> usize {
        self.ctx.reload_bus.publish(entity_type)
    }

    /// List controller over an existing navigation scope.
    pub fn list_controller<T: Entity>(
        &self,
        contract: Arc<EntityContract<T>>,
        navigation: NavigationScope,
    ) -> Arc<ListController<T>> {
        Arc::new(ListController::new(contract, Arc::clone(&self.ctx), navigation))
    }

    /// Detail controller over an existing navigation scope.
    pub fn detail_controller<T: Entity>(
        &self,
        contract: Arc<EntityContract<T>>,
        navigation: NavigationScope,
    ) -> Arc<DetailController<T>> {
        Arc::new(DetailController::new(
            contract,
            Arc::clone(&self.ctx),
            navigation,
        ))
    }

    /// Mounted page controller with its own navigation scope.
    ///
    /// The page follows reload signals and selection changes until the
    /// returned watchers are dropped. Must run inside a tokio runtime.
    pub fn page_controller<T: Entity>(
        &self,
        contract: Arc<EntityContract<T>>,
    ) -> (Arc<PageController<T>>, PageWatchers) {
        let page = Arc::new(PageController::new(contract, Arc::clone(&self.ctx)));
        let watchers = page.mount();
        (page, watchers)
    }
}

/// Builder for constructing `ScaffoldApp` with host adapters.
///
/// # Optional
/// - `notifier`: defaults to `LogNotifier`
/// - `config`: defaults to `ScaffoldConfig::default()`
/// - `reload_bus`: defaults to a bus sized from the config
#[derive(Default)]
pub struct ScaffoldAppBuilder {
    notifier: Option<Arc<dyn Notifier>>,
    config: Option<ScaffoldConfig>,
    reload_bus: Option<ReloadBus>,
}

impl ScaffoldAppBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    #[must_use]
    pub fn config(mut self, config: ScaffoldConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Read the config from a JSON file.
    ///
    /// # Errors
    /// Returns `ScaffoldError::Config` if the file is unreadable or invalid.
    pub fn config_file(self, path: impl AsRef<Path>) -> ScaffoldResult<Self> {
        let config = ScaffoldConfig::load(path)?;
        Ok(self.config(config))
    }

    /// Share a reload bus with another app instance.
    #[must_use]
    pub fn reload_bus(mut self, reload_bus: ReloadBus) -> Self {
        self.reload_bus = Some(reload_bus);
        self
    }

    /// Build the `ScaffoldApp`.
    ///
    /// # Errors
    /// Returns `ScaffoldError::Config` if the config does not validate.
    pub fn build(self) -> ScaffoldResult<ScaffoldApp> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let notifier = self.notifier.unwrap_or_else(|| Arc::new(LogNotifier));
        let ctx = match self.reload_bus {
            Some(bus) => ScaffoldContext::with_bus(notifier, config, bus),
            None => ScaffoldContext::new(notifier, config),
        };
        log::debug!("scaffold app built: {:?}", ctx.config);

        Ok(ScaffoldApp { ctx: Arc::new(ctx) })
    }
}
