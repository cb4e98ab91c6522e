//! Entity contract: the declarative description of one entity family

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{ScaffoldError, ScaffoldResult};
use crate::types::{Capability, CapabilitySet, ColumnDef, EntityType};

use super::entity_source::{
    Creatable, EntitySource, PermanentlyDeletable, SoftDeletable, Updatable,
};

/// Remote action bundle. Optional capabilities are `None` when not provided.
pub struct EntityActions<T> {
    source: Arc<dyn EntitySource<T>>,
    updater: Option<Arc<dyn Updatable<T>>>,
    creator: Option<Arc<dyn Creatable<T>>>,
    soft_deleter: Option<Arc<dyn SoftDeletable>>,
    permanent_deleter: Option<Arc<dyn PermanentlyDeletable>>,
}

/// Immutable entity family descriptor, created once per family.
///
/// Pure configuration: it owns no runtime state. Controllers share it through `Arc`.
pub struct EntityContract<T> {
    entity_type: EntityType,
    entity_name: String,
    plural_name: String,
    id_field: String,
    columns: Vec<ColumnDef>,
    actions: EntityActions<T>,
}

impl<T> EntityContract<T> {
    /// Start a contract over the required list/get source
    pub fn builder<S: EntitySource<T> + 'static>(
        entity_type: EntityType,
        entity_name: impl Into<String>,
        plural_name: impl Into<String>,
        source: Arc<S>,
    ) -> EntityContractBuilder<T> {
        EntityContractBuilder {
            entity_type,
            entity_name: entity_name.into(),
            plural_name: plural_name.into(),
            id_field: "id".to_string(),
            columns: Vec::new(),
            actions: EntityActions {
                source,
                updater: None,
                creator: None,
                soft_deleter: None,
                permanent_deleter: None,
            },
        }
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    pub fn plural_name(&self) -> &str {
        &self.plural_name
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column(&self, key: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn source(&self) -> &Arc<dyn EntitySource<T>> {
        &self.actions.source
    }

    pub fn updater(&self) -> ScaffoldResult<&Arc<dyn Updatable<T>>> {
        self.actions
            .updater
            .as_ref()
            .ok_or_else(|| self.unsupported(Capability::Update))
    }

    pub fn creator(&self) -> ScaffoldResult<&Arc<dyn Creatable<T>>> {
        self.actions
            .creator
            .as_ref()
            .ok_or_else(|| self.unsupported(Capability::Create))
    }

    pub fn soft_deleter(&self) -> ScaffoldResult<&Arc<dyn SoftDeletable>> {
        self.actions
            .soft_deleter
            .as_ref()
            .ok_or_else(|| self.unsupported(Capability::SoftDelete))
    }

    pub fn permanent_deleter(&self) -> ScaffoldResult<&Arc<dyn PermanentlyDeletable>> {
        self.actions
            .permanent_deleter
            .as_ref()
            .ok_or_else(|| self.unsupported(Capability::PermanentDelete))
    }

    pub fn capabilities(&self) -> CapabilitySet {
        CapabilitySet {
            update: self.actions.updater.is_some(),
            create: self.actions.creator.is_some(),
            soft_delete: self.actions.soft_deleter.is_some(),
            permanent_delete: self.actions.permanent_deleter.is_some(),
        }
    }

    fn unsupported(&self, capability: Capability) -> ScaffoldError {
        ScaffoldError::Unsupported {
            entity_type: self.entity_type,
            capability,
        }
    }
}

/// Builder for `EntityContract`
///
/// Each optional capability is attached by a method that only accepts an
/// implementor of the matching trait.
pub struct EntityContractBuilder<T> {
    entity_type: EntityType,
    entity_name: String,
    plural_name: String,
    id_field: String,
    columns: Vec<ColumnDef>,
    actions: EntityActions<T>,
}

impl<T: 'static> EntityContractBuilder<T> {
    #[must_use]
    pub fn id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self
    }

    #[must_use]
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub fn columns(mut self, columns: impl IntoIterator<Item = ColumnDef>) -> Self {
        self.columns.extend(columns);
        self
    }

    #[must_use]
    pub fn updatable<U: Updatable<T> + 'static>(mut self, updater: Arc<U>) -> Self {
        self.actions.updater = Some(updater);
        self
    }

    #[must_use]
    pub fn creatable<C: Creatable<T> + 'static>(mut self, creator: Arc<C>) -> Self {
        self.actions.creator = Some(creator);
        self
    }

    #[must_use]
    pub fn soft_deletable<D: SoftDeletable + 'static>(mut self, deleter: Arc<D>) -> Self {
        self.actions.soft_deleter = Some(deleter);
        self
    }

    #[must_use]
    pub fn permanently_deletable<D: PermanentlyDeletable + 'static>(
        mut self,
        deleter: Arc<D>,
    ) -> Self {
        self.actions.permanent_deleter = Some(deleter);
        self
    }

    /// Build the contract.
    ///
    /// # Errors
    /// Returns `ScaffoldError::Validation` on empty names or duplicate column keys.
    pub fn build(self) -> ScaffoldResult<EntityContract<T>> {
        if self.entity_name.trim().is_empty() || self.plural_name.trim().is_empty() {
            return Err(ScaffoldError::Validation(format!(
                "{} contract needs display names",
                self.entity_type
            )));
        }
        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.key.as_str()) {
                return Err(ScaffoldError::Validation(format!(
                    "duplicate column key: {}",
                    column.key
                )));
            }
        }

        Ok(EntityContract {
            entity_type: self.entity_type,
            entity_name: self.entity_name,
            plural_name: self.plural_name,
            id_field: self.id_field,
            columns: self.columns,
            actions: self.actions,
        })
    }
}
