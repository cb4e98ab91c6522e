//! Delete lifecycle callbacks

use async_trait::async_trait;

use crate::types::EntityId;

/// Invoked by the delete lifecycle after a successful operation.
///
/// The owning controller implements this; a list typically reloads, a detail
/// view closes after a permanent delete.
#[async_trait]
pub trait DeleteHooks: Send + Sync {
    async fn on_deleted(&self, _id: EntityId) {}

    async fn on_undeleted(&self, _id: EntityId) {}

    async fn on_permanently_deleted(&self, _id: EntityId) {}
}

/// Hooks that do nothing
pub struct NoopDeleteHooks;

#[async_trait]
impl DeleteHooks for NoopDeleteHooks {}
