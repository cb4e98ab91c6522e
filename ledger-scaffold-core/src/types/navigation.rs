//! Navigation level types

use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityId, EntityType};

/// Item held by a navigation level. Only the id matters to the stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub id: EntityId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl NavItem {
    pub fn from_entity<T: Entity>(entity: &T) -> Self {
        Self {
            id: entity.id(),
            label: entity.label(),
        }
    }
}

impl From<EntityId> for NavItem {
    fn from(id: EntityId) -> Self {
        Self { id, label: None }
    }
}

/// One tier of a drill-down: the sibling set being browsed and the selected member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationLevel {
    pub entity_type: EntityType,
    pub items: Vec<NavItem>,
    pub current_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<EntityId>,
}

impl NavigationLevel {
    pub fn new(
        entity_type: EntityType,
        items: Vec<NavItem>,
        current_id: Option<EntityId>,
        parent_id: Option<EntityId>,
    ) -> Self {
        Self {
            entity_type,
            items,
            current_id,
            parent_id,
        }
    }

    /// Position of `current_id` within `items`.
    ///
    /// Computed on every call: `items` may have been filtered out from under a
    /// stale `current_id`, which yields `None` rather than a panic.
    pub fn current_index(&self) -> Option<usize> {
        let id = self.current_id?;
        self.items.iter().position(|item| item.id == id)
    }

    pub fn current_item(&self) -> Option<&NavItem> {
        self.current_index().and_then(|i| self.items.get(i))
    }

    pub fn has_prev(&self) -> bool {
        self.current_index().is_some_and(|i| i > 0)
    }

    pub fn has_next(&self) -> bool {
        self.current_index()
            .is_some_and(|i| i + 1 < self.items.len())
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.items.iter().any(|item| item.id == id)
    }
}

/// Selection change fired by an explicit navigation action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationEvent {
    pub entity_type: EntityType,
    pub id: EntityId,
}

/// Movement within the top level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Prev,
    Next,
    Home,
    End,
}

/// One entry of the drill-down trail, root first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breadcrumb {
    pub entity_type: EntityType,
    pub id: Option<EntityId>,
    pub label: Option<String>,
}
