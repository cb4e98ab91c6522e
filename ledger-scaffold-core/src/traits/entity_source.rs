//! Remote entity action traits
//!
//! `EntitySource` is the required core of every entity contract. The remaining
//! traits are optional capabilities; a backend implements only the ones it
//! supports and the contract builder accepts only implementors.

use async_trait::async_trait;

use crate::error::ScaffoldResult;
use crate::types::{DeleteConfirmation, EntityId};

/// Required read access to one entity family
///
/// Platform implementation: each entity screen supplies one over its backend.
#[async_trait]
pub trait EntitySource<T>: Send + Sync {
    /// Get all entities, soft-deleted ones included
    async fn list(&self) -> ScaffoldResult<Vec<T>>;

    /// Get one entity
    ///
    /// # Arguments
    /// * `id` - Entity ID
    async fn get(&self, id: EntityId) -> ScaffoldResult<T>;
}

#[async_trait]
pub trait Updatable<T>: Send + Sync {
    /// Save the edited entity
    ///
    /// # Arguments
    /// * `id` - Entity ID
    /// * `patch` - Edited draft
    async fn update(&self, id: EntityId, patch: &T) -> ScaffoldResult<()>;
}

#[async_trait]
pub trait Creatable<T>: Send + Sync {
    /// Create an entity, returning it as stored (with its assigned id)
    async fn create(&self, data: &T) -> ScaffoldResult<T>;
}

/// Reversible delete
#[async_trait]
pub trait SoftDeletable: Send + Sync {
    async fn soft_delete(&self, id: EntityId) -> ScaffoldResult<()>;

    async fn undelete(&self, id: EntityId) -> ScaffoldResult<()>;
}

/// Irreversible delete
#[async_trait]
pub trait PermanentlyDeletable: Send + Sync {
    async fn permanent_delete(&self, id: EntityId) -> ScaffoldResult<()>;

    /// Preview of the cascade a permanent delete causes
    ///
    /// # Returns
    /// * `Some(confirmation)` - Backend-produced preview
    /// * `None` - No preview offered; a generic confirmation is shown instead
    async fn delete_confirmation(&self, _id: EntityId) -> ScaffoldResult<Option<DeleteConfirmation>> {
        Ok(None)
    }
}
