//! List controller
//!
//! Owns the loaded collection of one entity family and derives the visible
//! rows from it. Filtering runs in a fixed order: soft-delete visibility, then
//! free-text search, then the optional sort. Selection lives in the shared
//! navigation scope, never here.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ScaffoldError, ScaffoldResult};
use crate::services::{
    DeleteLifecycle, NavigationScope, ReloadOutcome, ReloadWatcher, ScaffoldContext,
};
use crate::traits::{DeleteHooks, EntityContract, NoopDeleteHooks};
use crate::types::{
    BatchDeleteFailure, BatchDeleteResult, ColumnDef, Entity, EntityId, KeyOutcome, ListKey,
    NavItem, NavigationLevel, SortDirection, SortSpec,
};

/// List state
#[derive(Debug, Clone)]
pub struct ListState<T> {
    /// Everything `list()` returned, soft-deleted rows included
    pub items: Vec<T>,
    pub loading: bool,
    /// Last load failure; previously loaded items are kept alongside it
    pub error: Option<String>,
    pub search: String,
    pub sort: Option<SortSpec>,
    pub show_deleted: bool,
}

impl<T> ListState<T> {
    fn new(show_deleted: bool) -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
            search: String::new(),
            sort: None,
            show_deleted,
        }
    }
}

/// List controller for one entity family
pub struct ListController<T> {
    contract: Arc<EntityContract<T>>,
    ctx: Arc<ScaffoldContext>,
    navigation: NavigationScope,
    delete: DeleteLifecycle<T>,
    state: RwLock<ListState<T>>,
    generation: AtomicU64,
}

impl<T: Entity> ListController<T> {
    #[must_use]
    pub fn new(
        contract: Arc<EntityContract<T>>,
        ctx: Arc<ScaffoldContext>,
        navigation: NavigationScope,
    ) -> Self {
        let show_deleted = ctx.config.show_deleted_by_default;
        Self {
            delete: DeleteLifecycle::new(Arc::clone(&contract), Arc::clone(&ctx)),
            contract,
            ctx,
            navigation,
            state: RwLock::new(ListState::new(show_deleted)),
            generation: AtomicU64::new(0),
        }
    }

    pub fn contract(&self) -> &Arc<EntityContract<T>> {
        &self.contract
    }

    pub fn navigation(&self) -> &NavigationScope {
        &self.navigation
    }

    /// Delete dialog state for rendering
    pub fn delete_lifecycle(&self) -> &DeleteLifecycle<T> {
        &self.delete
    }

    pub fn state(&self) -> ListState<T> {
        self.read().clone()
    }

    pub fn items(&self) -> Vec<T> {
        self.read().items.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.read().loading
    }

    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    pub fn show_deleted(&self) -> bool {
        self.read().show_deleted
    }

    /// Load the collection and republish it into the navigation scope.
    ///
    /// Only the latest issued reload may store its response.
    pub async fn reload(&self) -> ReloadOutcome {
        let generation = self.generation.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        self.write().loading = true;

        let result = self.contract.source().list().await;

        if self.generation.load(AtomicOrdering::SeqCst) != generation {
            log::debug!(
                "{} list reload {generation} superseded, dropping response",
                self.contract.entity_type()
            );
            return ReloadOutcome::Stale;
        }

        match result {
            Ok(items) => {
                let visible = {
                    let mut state = self.write();
                    state.items = items;
                    state.loading = false;
                    state.error = None;
                    self.filter(&state)
                };
                self.publish_visible(&visible, true);
                ReloadOutcome::Applied
            }
            Err(e) => {
                e.log(&format!("load {}", self.contract.plural_name()));
                let mut state = self.write();
                state.loading = false;
                state.error = Some(e.to_string());
                ReloadOutcome::Failed
            }
        }
    }

    /// Re-run `reload()` whenever this family's reload topic fires.
    pub fn watch_reloads(self: &Arc<Self>) -> ReloadWatcher {
        let subscription = self.ctx.reload_bus.subscribe(self.contract.entity_type());
        ReloadWatcher::spawn(subscription, Arc::downgrade(self), |list| async move {
            list.reload().await;
        })
    }

    /// Rows after visibility, search, and sort
    pub fn visible_items(&self) -> Vec<T> {
        self.filter(&self.read())
    }

    pub fn set_search(&self, search: impl Into<String>) {
        self.update_view(|state| state.search = search.into());
    }

    pub fn set_show_deleted(&self, show_deleted: bool) {
        self.update_view(|state| state.show_deleted = show_deleted);
    }

    /// Sort by one field. Declared columns must be sortable.
    pub fn set_sort(&self, field: impl Into<String>, direction: SortDirection) -> ScaffoldResult<()> {
        let field = field.into();
        if self.contract.column(&field).is_some_and(|c| !c.sortable) {
            return Err(ScaffoldError::Validation(format!(
                "column {field} is not sortable"
            )));
        }
        self.update_view(|state| state.sort = Some(SortSpec { field, direction }));
        Ok(())
    }

    pub fn clear_sort(&self) {
        self.update_view(|state| state.sort = None);
    }

    /// Cycle a column header: ascending, descending, unsorted.
    pub fn toggle_sort(&self, field: &str) -> ScaffoldResult<()> {
        let current = self.read().sort.clone();
        match current {
            Some(spec) if spec.field == field && spec.direction == SortDirection::Asc => {
                self.set_sort(field, spec.direction.reversed())
            }
            Some(spec) if spec.field == field => {
                self.clear_sort();
                Ok(())
            }
            _ => self.set_sort(field, SortDirection::Asc),
        }
    }

    pub fn selected_id(&self) -> Option<EntityId> {
        self.navigation.current_id()
    }

    /// Write-through to the navigation scope
    pub fn set_selected_id(&self, id: EntityId) {
        self.navigation.set_current_id(id);
    }

    /// Selected row, if it is still loaded
    pub fn selected_item(&self) -> Option<T> {
        let id = self.selected_id()?;
        self.read().items.iter().find(|item| item.id() == id).cloned()
    }

    /// Keyboard handling for a focused list surface.
    ///
    /// Movement is over visible rows without wraparound. Enter activates the
    /// selected row only if it is still visible.
    pub fn handle_key(&self, key: ListKey) -> KeyOutcome<T> {
        let visible = self.visible_items();
        let selected = self.selected_id();
        let index = selected.and_then(|id| visible.iter().position(|item| item.id() == id));

        let target = match key {
            ListKey::ArrowDown => match index {
                Some(i) if i + 1 < visible.len() => Some(i + 1),
                None if !visible.is_empty() => Some(0),
                _ => None,
            },
            ListKey::ArrowUp => index.and_then(|i| i.checked_sub(1)),
            ListKey::Home => (!visible.is_empty()).then_some(0),
            ListKey::End => visible.len().checked_sub(1),
            ListKey::Enter => {
                return match index.and_then(|i| visible.get(i)) {
                    Some(item) => KeyOutcome::activate(item.clone()),
                    None => KeyOutcome::handled(),
                };
            }
        };

        if let Some(item) = target.and_then(|i| visible.get(i)) {
            if selected != Some(item.id()) {
                self.set_selected_id(item.id());
            }
        }
        KeyOutcome::handled()
    }

    pub async fn handle_delete(&self, id: EntityId) -> ScaffoldResult<()> {
        self.delete.handle_delete(id, self).await
    }

    pub async fn handle_undelete(&self, id: EntityId) -> ScaffoldResult<()> {
        self.delete.handle_undelete(id, self).await
    }

    pub async fn handle_permanent_delete_click(&self, id: EntityId) {
        self.delete.handle_permanent_delete_click(id).await;
    }

    pub async fn handle_permanent_delete_confirm(&self) {
        self.delete.handle_permanent_delete_confirm(self).await;
    }

    pub fn handle_delete_modal_close(&self) {
        self.delete.handle_delete_modal_close();
    }

    /// Soft delete several rows, collecting per-item failures; reloads once.
    pub async fn handle_bulk_delete(&self, ids: &[EntityId]) -> BatchDeleteResult {
        let mut result = BatchDeleteResult::default();
        for &id in ids {
            match self.delete.handle_delete(id, &NoopDeleteHooks).await {
                Ok(()) => result.success_count += 1,
                Err(e) => result.failures.push(BatchDeleteFailure {
                    id,
                    reason: e.to_string(),
                }),
            }
        }
        if result.success_count > 0 {
            self.reload().await;
        }
        result
    }

    fn update_view(&self, f: impl FnOnce(&mut ListState<T>)) {
        let visible = {
            let mut state = self.write();
            f(&mut state);
            self.filter(&state)
        };
        self.publish_visible(&visible, false);
    }

    fn filter(&self, state: &ListState<T>) -> Vec<T> {
        filter_items(
            state,
            self.contract.columns(),
            self.ctx.config.search_min_chars,
        )
    }

    /// Mirror the visible rows into the navigation scope.
    ///
    /// After a load the stack is reset to one level, keeping the remembered
    /// selection if still visible, else the first row. A view change only
    /// swaps the items of our level and leaves the selection alone.
    fn publish_visible(&self, visible: &[T], reset: bool) {
        let entity_type = self.contract.entity_type();
        let nav_items: Vec<NavItem> = visible.iter().map(NavItem::from_entity).collect();

        if reset {
            let remembered = self
                .navigation
                .snapshot()
                .levels()
                .iter()
                .rev()
                .find(|level| level.entity_type == entity_type)
                .and_then(|level| level.current_id);
            let level = NavigationLevel::new(entity_type, nav_items, None, None);
            let current = remembered
                .filter(|id| level.contains(*id))
                .or_else(|| level.items.first().map(|item| item.id));
            self.navigation.set_items(entity_type, level.items, current);
            return;
        }

        let snapshot = self.navigation.snapshot();
        if snapshot.depth() == 1
            && snapshot
                .current_level()
                .is_some_and(|level| level.entity_type == entity_type)
        {
            self.navigation.replace_items(nav_items);
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ListState<T>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ListState<T>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl<T: Entity> DeleteHooks for ListController<T> {
    async fn on_deleted(&self, _id: EntityId) {
        self.reload().await;
    }

    async fn on_undeleted(&self, _id: EntityId) {
        self.reload().await;
    }

    async fn on_permanently_deleted(&self, _id: EntityId) {
        self.reload().await;
    }
}

fn filter_items<T: Entity>(state: &ListState<T>, columns: &[ColumnDef], min_chars: usize) -> Vec<T> {
    let query = state.search.trim().to_lowercase();
    let search_active = !query.is_empty() && query.chars().count() >= min_chars;

    let rows = state
        .items
        .iter()
        .filter(|item| state.show_deleted || !item.is_deleted())
        .filter(|item| !search_active || matches_search(*item, columns, &query));

    let Some(sort) = &state.sort else {
        return rows.cloned().collect();
    };

    // one serialization per row, not per comparison
    let mut keyed: Vec<(Value, &T)> = rows.map(|item| (item.field(&sort.field), item)).collect();
    keyed.sort_by(|(a, _), (b, _)| compare_rows(a, b, sort.direction));
    keyed.into_iter().map(|(_, item)| item.clone()).collect()
}

/// Case-insensitive substring match over searchable columns.
///
/// Only strings and numbers take part; nested values are skipped rather than
/// stringified.
fn matches_search<T: Entity>(item: &T, columns: &[ColumnDef], query: &str) -> bool {
    columns
        .iter()
        .filter(|c| c.searchable)
        .any(|c| match item.field(&c.key) {
            Value::String(s) => s.to_lowercase().contains(query),
            Value::Number(n) => n.to_string().contains(query),
            _ => false,
        })
}

/// Missing values sort last in either direction.
fn compare_rows(a: &Value, b: &Value, direction: SortDirection) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ordering = compare_values(a, b);
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        }
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x
            .to_lowercase()
            .cmp(&y.to_lowercase())
            .then_with(|| x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}
