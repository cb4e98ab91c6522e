//! Detail controller
//!
//! Owns one entity by id, the editable draft of it, and traversal over the
//! siblings held by the navigation scope.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::error::{ScaffoldError, ScaffoldResult};
use crate::services::{
    DeleteLifecycle, NavigationScope, ReloadOutcome, ReloadWatcher, ScaffoldContext,
};
use crate::traits::{DeleteHooks, EntityContract};
use crate::types::{Entity, EntityId, NavDirection};

type IdCallback = Arc<dyn Fn(EntityId) + Send + Sync>;
type CloseCallback = Arc<dyn Fn() + Send + Sync>;

/// Detail state
#[derive(Debug, Clone)]
pub struct DetailState<T> {
    pub id: Option<EntityId>,
    /// Last successfully loaded server state
    pub item: Option<T>,
    /// Edit buffer; refreshed from `item` on every load
    pub draft: Option<T>,
    pub editing: bool,
    /// Draft is a new entity without an id yet
    pub creating: bool,
    pub loading: bool,
    pub saving: bool,
    pub error: Option<String>,
}

impl<T> Default for DetailState<T> {
    fn default() -> Self {
        Self {
            id: None,
            item: None,
            draft: None,
            editing: false,
            creating: false,
            loading: false,
            saving: false,
            error: None,
        }
    }
}

/// Detail controller for one entity family
pub struct DetailController<T> {
    contract: Arc<EntityContract<T>>,
    ctx: Arc<ScaffoldContext>,
    navigation: NavigationScope,
    delete: DeleteLifecycle<T>,
    state: RwLock<DetailState<T>>,
    generation: AtomicU64,
    on_navigate: RwLock<Option<IdCallback>>,
    on_close: RwLock<Option<CloseCallback>>,
}

impl<T: Entity> DetailController<T> {
    #[must_use]
    pub fn new(
        contract: Arc<EntityContract<T>>,
        ctx: Arc<ScaffoldContext>,
        navigation: NavigationScope,
    ) -> Self {
        Self {
            delete: DeleteLifecycle::new(Arc::clone(&contract), Arc::clone(&ctx)),
            contract,
            ctx,
            navigation,
            state: RwLock::new(DetailState::default()),
            generation: AtomicU64::new(0),
            on_navigate: RwLock::new(None),
            on_close: RwLock::new(None),
        }
    }

    pub fn contract(&self) -> &Arc<EntityContract<T>> {
        &self.contract
    }

    pub fn navigation(&self) -> &NavigationScope {
        &self.navigation
    }

    pub fn delete_lifecycle(&self) -> &DeleteLifecycle<T> {
        &self.delete
    }

    pub fn state(&self) -> DetailState<T> {
        self.read().clone()
    }

    pub fn id(&self) -> Option<EntityId> {
        self.read().id
    }

    pub fn item(&self) -> Option<T> {
        self.read().item.clone()
    }

    pub fn draft(&self) -> Option<T> {
        self.read().draft.clone()
    }

    pub fn is_editing(&self) -> bool {
        self.read().editing
    }

    /// Called with the new id after every traversal move.
    pub fn set_on_navigate(&self, callback: impl Fn(EntityId) + Send + Sync + 'static) {
        *self
            .on_navigate
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(callback));
    }

    /// Called once the entity was permanently deleted.
    pub fn set_on_close(&self, callback: impl Fn() + Send + Sync + 'static) {
        *self.on_close.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(callback));
    }

    /// Point at `id` and load it.
    pub async fn load(&self, id: EntityId) -> ReloadOutcome {
        self.point_at(id);
        self.reload().await
    }

    /// Switch to `id` without fetching; state of another id is dropped.
    pub fn point_at(&self, id: EntityId) {
        let mut state = self.write();
        if state.id != Some(id) {
            *state = DetailState {
                id: Some(id),
                ..DetailState::default()
            };
        }
    }

    /// Fetch the current id, replacing both `item` and `draft`.
    ///
    /// A failure clears `item`: there is no stale fallback for a single entity.
    pub async fn reload(&self) -> ReloadOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let Some(id) = self.id() else {
            let mut state = self.write();
            state.loading = false;
            state.error = Some(ScaffoldError::NoSelection.to_string());
            return ReloadOutcome::Failed;
        };
        self.write().loading = true;

        let result = self.contract.source().get(id).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            log::debug!(
                "{} {id} reload {generation} superseded, dropping response",
                self.contract.entity_type()
            );
            return ReloadOutcome::Stale;
        }

        let mut state = self.write();
        state.loading = false;
        match result {
            Ok(item) => {
                state.draft = Some(item.clone());
                state.item = Some(item);
                state.error = None;
                ReloadOutcome::Applied
            }
            Err(e) => {
                e.log(&format!("load {} {id}", self.contract.entity_type()));
                state.item = None;
                state.draft = None;
                state.error = Some(e.to_string());
                ReloadOutcome::Failed
            }
        }
    }

    /// Re-run `reload()` whenever this family's reload topic fires.
    pub fn watch_reloads(self: &Arc<Self>) -> ReloadWatcher {
        let subscription = self.ctx.reload_bus.subscribe(self.contract.entity_type());
        ReloadWatcher::spawn(subscription, Arc::downgrade(self), |detail| async move {
            if detail.id().is_some() && !detail.is_editing() {
                detail.reload().await;
            }
        })
    }

    /// Drop the entity and any in-flight load.
    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.write() = DetailState::default();
    }

    /// Open (`true`) or discard (`false`) the draft.
    pub fn set_editing(&self, editing: bool) {
        if !editing {
            self.handle_cancel();
            return;
        }
        let mut state = self.write();
        match state.item.clone() {
            Some(item) => {
                state.draft = Some(item);
                state.editing = true;
            }
            None => log::warn!("cannot edit {}: nothing loaded", self.contract.entity_name()),
        }
    }

    /// Mutate the open draft.
    pub fn edit_draft(&self, f: impl FnOnce(&mut T)) -> ScaffoldResult<()> {
        let mut state = self.write();
        if !state.editing {
            return Err(ScaffoldError::InvalidState("no draft is open".to_string()));
        }
        let draft = state
            .draft
            .as_mut()
            .ok_or_else(|| ScaffoldError::InvalidState("no draft is open".to_string()))?;
        f(draft);
        Ok(())
    }

    /// Whether the open draft differs from the loaded item
    pub fn is_dirty(&self) -> bool {
        let state = self.read();
        if !state.editing {
            return false;
        }
        if state.creating {
            return true;
        }
        match (&state.draft, &state.item) {
            (Some(draft), Some(item)) => {
                serde_json::to_value(draft).ok() != serde_json::to_value(item).ok()
            }
            (draft, item) => draft.is_some() != item.is_some(),
        }
    }

    /// Save the draft. On failure the draft stays open for correction.
    pub async fn handle_save(&self) {
        let name = self.contract.entity_name();
        let (id, draft) = {
            let mut state = self.write();
            match (state.id, state.draft.clone()) {
                (Some(id), Some(draft)) if state.editing && !state.saving && !state.creating => {
                    state.saving = true;
                    (id, draft)
                }
                _ => {
                    log::warn!("save of {name} ignored: no open draft");
                    return;
                }
            }
        };

        let result = match self.contract.updater() {
            Ok(updater) => updater.update(id, &draft).await,
            Err(e) => Err(e),
        };

        self.write().saving = false;
        match result {
            Ok(()) => {
                log::info!("{} {id} updated", self.contract.entity_type());
                self.write().editing = false;
                self.ctx.notify_success(format!("{name} saved"));
                self.reload().await;
                self.ctx.reload_bus.publish(self.contract.entity_type());
            }
            Err(e) => {
                e.log(&format!("update {} {id}", self.contract.entity_type()));
                self.ctx.notify_error(format!("Failed to save {name}: {e}"));
            }
        }
    }

    /// Discard the draft and restore it from the loaded item.
    pub fn handle_cancel(&self) {
        let mut state = self.write();
        state.draft = state.item.clone();
        state.editing = false;
        state.creating = false;
    }

    /// Start a draft for a new entity.
    pub fn begin_create(&self, template: T) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.write() = DetailState {
            draft: Some(template),
            editing: true,
            creating: true,
            ..DetailState::default()
        };
    }

    /// Create the drafted entity; returns its id and points the controller at it.
    pub async fn handle_create(&self) -> Option<EntityId> {
        let name = self.contract.entity_name();
        let draft = {
            let mut state = self.write();
            match state.draft.clone() {
                Some(draft) if state.creating && !state.saving => {
                    state.saving = true;
                    draft
                }
                _ => {
                    log::warn!("create of {name} ignored: no new draft");
                    return None;
                }
            }
        };

        let result = match self.contract.creator() {
            Ok(creator) => creator.create(&draft).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(created) => {
                let id = created.id();
                log::info!("{} {id} created", self.contract.entity_type());
                self.generation.fetch_add(1, Ordering::SeqCst);
                *self.write() = DetailState {
                    id: Some(id),
                    draft: Some(created.clone()),
                    item: Some(created),
                    ..DetailState::default()
                };
                self.ctx.notify_success(format!("{name} created"));
                self.ctx.reload_bus.publish(self.contract.entity_type());
                Some(id)
            }
            Err(e) => {
                self.write().saving = false;
                e.log(&format!("create {}", self.contract.entity_type()));
                self.ctx.notify_error(format!("Failed to create {name}: {e}"));
                None
            }
        }
    }

    /// Move within the navigation scope and report the new id.
    ///
    /// Does not reload; the owner re-points with `load`.
    pub fn go(&self, direction: NavDirection) -> Option<EntityId> {
        let id = self.navigation.go(direction)?;
        let callback = self
            .on_navigate
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(callback) = callback {
            callback(id);
        }
        Some(id)
    }

    pub fn go_next(&self) -> Option<EntityId> {
        self.go(NavDirection::Next)
    }

    pub fn go_prev(&self) -> Option<EntityId> {
        self.go(NavDirection::Prev)
    }

    pub fn go_home(&self) -> Option<EntityId> {
        self.go(NavDirection::Home)
    }

    pub fn go_end(&self) -> Option<EntityId> {
        self.go(NavDirection::End)
    }

    pub fn has_prev(&self) -> bool {
        self.navigation.has_prev()
    }

    pub fn has_next(&self) -> bool {
        self.navigation.has_next()
    }

    pub async fn handle_delete(&self) -> ScaffoldResult<()> {
        let id = self.id().ok_or(ScaffoldError::NoSelection)?;
        self.delete.handle_delete(id, self).await
    }

    pub async fn handle_undelete(&self) -> ScaffoldResult<()> {
        let id = self.id().ok_or(ScaffoldError::NoSelection)?;
        self.delete.handle_undelete(id, self).await
    }

    pub async fn handle_permanent_delete_click(&self) {
        match self.id() {
            Some(id) => self.delete.handle_permanent_delete_click(id).await,
            None => log::warn!("permanent delete clicked with nothing loaded"),
        }
    }

    pub async fn handle_permanent_delete_confirm(&self) {
        self.delete.handle_permanent_delete_confirm(self).await;
    }

    pub fn handle_delete_modal_close(&self) {
        self.delete.handle_delete_modal_close();
    }

    fn read(&self) -> RwLockReadGuard<'_, DetailState<T>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, DetailState<T>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl<T: Entity> DeleteHooks for DetailController<T> {
    async fn on_deleted(&self, _id: EntityId) {
        self.reload().await;
        self.ctx.reload_bus.publish(self.contract.entity_type());
    }

    async fn on_undeleted(&self, _id: EntityId) {
        self.reload().await;
        self.ctx.reload_bus.publish(self.contract.entity_type());
    }

    async fn on_permanently_deleted(&self, _id: EntityId) {
        self.clear();
        let callback = self
            .on_close
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(callback) = callback {
            callback();
        }
        self.ctx.reload_bus.publish(self.contract.entity_type());
    }
}
