//! Hierarchical navigation stack
//!
//! `NavigationStack` is the plain state: ordered levels of sibling items, each
//! with its current selection. Mutations that change the selection through an
//! explicit navigation action return the `NavigationEvent` to fire.
//!
//! `NavigationScope` is the shared handle controllers receive explicitly. It
//! owns one stack plus the `on_navigate` listener, so two pages with separate
//! scopes never see each other's selection.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::types::{
    Breadcrumb, EntityId, EntityType, NavDirection, NavItem, NavigationEvent, NavigationLevel,
};

/// Navigation stack state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationStack {
    levels: Vec<NavigationLevel>,
}

impl NavigationStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn levels(&self) -> &[NavigationLevel] {
        &self.levels
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn current_level(&self) -> Option<&NavigationLevel> {
        self.levels.last()
    }

    pub fn current_id(&self) -> Option<EntityId> {
        self.current_level().and_then(|l| l.current_id)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_level().and_then(NavigationLevel::current_index)
    }

    pub fn has_prev(&self) -> bool {
        self.current_level().is_some_and(NavigationLevel::has_prev)
    }

    pub fn has_next(&self) -> bool {
        self.current_level().is_some_and(NavigationLevel::has_next)
    }

    /// Replace the whole stack with one root level. Does not fire.
    pub fn set_items(
        &mut self,
        entity_type: EntityType,
        items: Vec<NavItem>,
        current_id: Option<EntityId>,
    ) {
        self.levels = vec![NavigationLevel::new(entity_type, items, current_id, None)];
    }

    /// Replace the top level's items, keeping its selection even if it is no
    /// longer present. Passive update: does not fire.
    pub fn replace_items(&mut self, items: Vec<NavItem>) {
        if let Some(level) = self.levels.last_mut() {
            level.items = items;
        }
    }

    /// Set the top level's selection. The id is not looked up in `items`.
    pub fn set_current_id(&mut self, id: EntityId) -> Option<NavigationEvent> {
        let level = self.levels.last_mut()?;
        level.current_id = Some(id);
        Some(NavigationEvent {
            entity_type: level.entity_type,
            id,
        })
    }

    /// Append a child level scoped under `parent_id`.
    pub fn push(
        &mut self,
        entity_type: EntityType,
        items: Vec<NavItem>,
        current_id: Option<EntityId>,
        parent_id: Option<EntityId>,
    ) -> Option<NavigationEvent> {
        self.levels
            .push(NavigationLevel::new(entity_type, items, current_id, parent_id));
        current_id.map(|id| NavigationEvent { entity_type, id })
    }

    /// Remove the top level. No-op at depth <= 1.
    pub fn pop(&mut self) -> Option<NavigationEvent> {
        if self.levels.len() <= 1 {
            return None;
        }
        self.levels.pop();
        let level = self.current_level()?;
        level.current_id.map(|id| NavigationEvent {
            entity_type: level.entity_type,
            id,
        })
    }

    pub fn go(&mut self, direction: NavDirection) -> Option<NavigationEvent> {
        match direction {
            NavDirection::Prev => self.go_prev(),
            NavDirection::Next => self.go_next(),
            NavDirection::Home => self.go_home(),
            NavDirection::End => self.go_end(),
        }
    }

    pub fn go_next(&mut self) -> Option<NavigationEvent> {
        if !self.has_next() {
            return None;
        }
        let index = self.current_index()?;
        self.go_to_index(index + 1)
    }

    pub fn go_prev(&mut self) -> Option<NavigationEvent> {
        if !self.has_prev() {
            return None;
        }
        let index = self.current_index()?;
        self.go_to_index(index - 1)
    }

    pub fn go_home(&mut self) -> Option<NavigationEvent> {
        self.go_to_index(0)
    }

    pub fn go_end(&mut self) -> Option<NavigationEvent> {
        let last = self.current_level()?.items.len().checked_sub(1)?;
        self.go_to_index(last)
    }

    /// Select the item at `index` in the top level. No-op when out of range or
    /// already selected.
    pub fn go_to_index(&mut self, index: usize) -> Option<NavigationEvent> {
        let level = self.current_level()?;
        let id = level.items.get(index)?.id;
        if level.current_id == Some(id) {
            return None;
        }
        self.set_current_id(id)
    }

    /// Current item of every level, root first.
    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.levels
            .iter()
            .map(|level| Breadcrumb {
                entity_type: level.entity_type,
                id: level.current_id,
                label: level.current_item().and_then(|item| item.label.clone()),
            })
            .collect()
    }

    pub fn reset(&mut self) {
        self.levels.clear();
    }
}

type NavigateListener = Arc<dyn Fn(NavigationEvent) + Send + Sync>;

struct ScopeInner {
    stack: RwLock<NavigationStack>,
    listener: RwLock<Option<NavigateListener>>,
}

/// Shared, explicitly injected navigation stack.
///
/// Cloning yields another handle onto the same stack. The listener is called
/// after the stack lock is released, so it may read the scope.
#[derive(Clone)]
pub struct NavigationScope {
    inner: Arc<ScopeInner>,
}

impl Default for NavigationScope {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NavigationScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationScope")
            .field("stack", &*self.read())
            .finish_non_exhaustive()
    }
}

impl NavigationScope {
    /// Create an empty scope
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                stack: RwLock::new(NavigationStack::new()),
                listener: RwLock::new(None),
            }),
        }
    }

    /// Register the `on_navigate` side channel, replacing any previous one.
    pub fn set_on_navigate(&self, listener: impl Fn(NavigationEvent) + Send + Sync + 'static) {
        *self
            .inner
            .listener
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(listener));
    }

    pub fn clear_on_navigate(&self) {
        *self
            .inner
            .listener
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Whether both handles point at the same stack
    pub fn same_scope(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Copy of the current stack
    pub fn snapshot(&self) -> NavigationStack {
        self.read().clone()
    }

    pub fn depth(&self) -> usize {
        self.read().depth()
    }

    pub fn current_level(&self) -> Option<NavigationLevel> {
        self.read().current_level().cloned()
    }

    pub fn current_id(&self) -> Option<EntityId> {
        self.read().current_id()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.read().current_index()
    }

    pub fn has_prev(&self) -> bool {
        self.read().has_prev()
    }

    pub fn has_next(&self) -> bool {
        self.read().has_next()
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.read().breadcrumbs()
    }

    pub fn set_items(
        &self,
        entity_type: EntityType,
        items: Vec<NavItem>,
        current_id: Option<EntityId>,
    ) {
        self.write().set_items(entity_type, items, current_id);
    }

    pub fn replace_items(&self, items: Vec<NavItem>) {
        self.write().replace_items(items);
    }

    pub fn set_current_id(&self, id: EntityId) {
        self.mutate(|stack| stack.set_current_id(id));
    }

    pub fn push(
        &self,
        entity_type: EntityType,
        items: Vec<NavItem>,
        current_id: Option<EntityId>,
        parent_id: Option<EntityId>,
    ) {
        self.mutate(|stack| stack.push(entity_type, items, current_id, parent_id));
    }

    pub fn pop(&self) {
        self.mutate(NavigationStack::pop);
    }

    /// Move within the top level; returns the newly selected id if it moved.
    pub fn go(&self, direction: NavDirection) -> Option<EntityId> {
        self.mutate(|stack| stack.go(direction))
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

    pub fn go_to_index(&self, index: usize) -> Option<EntityId> {
        self.mutate(|stack| stack.go_to_index(index))
    }

    pub fn reset(&self) {
        self.write().reset();
    }

    fn mutate(
        &self,
        f: impl FnOnce(&mut NavigationStack) -> Option<NavigationEvent>,
    ) -> Option<EntityId> {
        let event = f(&mut self.write())?;
        log::debug!("navigate: {} -> {}", event.entity_type, event.id);

        let listener = self
            .inner
            .listener
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(listener) = listener {
            listener(event);
        }
        Some(event.id)
    }

    fn read(&self) -> RwLockReadGuard<'_, NavigationStack> {
        self.inner.stack.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, NavigationStack> {
        self.inner.stack.write().unwrap_or_else(PoisonError::into_inner)
    }
}
