//! In-memory entity store implementing every contract capability.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use ledger_scaffold_core::error::{ScaffoldError, ScaffoldResult};
use ledger_scaffold_core::traits::{
    Creatable, EntityContract, EntityContractBuilder, EntitySource, PermanentlyDeletable,
    SoftDeletable, Updatable,
};
use ledger_scaffold_core::types::{DeleteConfirmation, Entity, EntityId, EntityType};
use tokio::sync::RwLock;

/// Entity the memory store can assign ids to and soft delete
pub trait StoredEntity: Entity {
    fn set_id(&mut self, id: EntityId);

    fn set_deleted(&mut self, deleted: bool);
}

type ConfirmationFn<T> = Box<dyn Fn(&T) -> Option<DeleteConfirmation> + Send + Sync>;

/// In-memory store for one entity family
///
/// Ids are assigned sequentially after the largest seeded id.
pub struct MemoryStore<T> {
    entity_type: EntityType,
    items: RwLock<Vec<T>>,
    next_id: AtomicI64,
    confirmation: Option<ConfirmationFn<T>>,
}

impl<T: StoredEntity> MemoryStore<T> {
    #[must_use]
    pub fn new(entity_type: EntityType, items: Vec<T>) -> Self {
        let next_id = items.iter().map(Entity::id).max().unwrap_or(0) + 1;
        Self {
            entity_type,
            items: RwLock::new(items),
            next_id: AtomicI64::new(next_id),
            confirmation: None,
        }
    }

    /// Produce delete previews from the stored entity
    #[must_use]
    pub fn with_confirmation(
        mut self,
        preview: impl Fn(&T) -> Option<DeleteConfirmation> + Send + Sync + 'static,
    ) -> Self {
        self.confirmation = Some(Box::new(preview));
        self
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Copy of everything stored, soft-deleted rows included
    pub async fn snapshot(&self) -> Vec<T> {
        self.items.read().await.clone()
    }

    /// Contract builder with every capability of this store attached
    pub fn contract_builder(
        self: &Arc<Self>,
        entity_name: &str,
        plural_name: &str,
    ) -> EntityContractBuilder<T> {
        EntityContract::builder(self.entity_type, entity_name, plural_name, Arc::clone(self))
            .updatable(Arc::clone(self))
            .creatable(Arc::clone(self))
            .soft_deletable(Arc::clone(self))
            .permanently_deletable(Arc::clone(self))
    }

    fn not_found(&self, id: EntityId) -> ScaffoldError {
        ScaffoldError::NotFound {
            entity_type: self.entity_type,
            id,
        }
    }

    async fn set_deleted(&self, id: EntityId, deleted: bool) -> ScaffoldResult<()> {
        let mut items = self.items.write().await;
        let item = items
            .iter_mut()
            .find(|i| i.id() == id)
            .ok_or_else(|| self.not_found(id))?;
        item.set_deleted(deleted);
        Ok(())
    }
}

#[async_trait]
impl<T: StoredEntity> EntitySource<T> for MemoryStore<T> {
    async fn list(&self) -> ScaffoldResult<Vec<T>> {
        Ok(self.snapshot().await)
    }

    async fn get(&self, id: EntityId) -> ScaffoldResult<T> {
        self.items
            .read()
            .await
            .iter()
            .find(|i| i.id() == id)
            .cloned()
            .ok_or_else(|| self.not_found(id))
    }
}

#[async_trait]
impl<T: StoredEntity> Updatable<T> for MemoryStore<T> {
    async fn update(&self, id: EntityId, patch: &T) -> ScaffoldResult<()> {
        let mut items = self.items.write().await;
        let item = items
            .iter_mut()
            .find(|i| i.id() == id)
            .ok_or_else(|| self.not_found(id))?;
        let mut updated = patch.clone();
        updated.set_id(id);
        *item = updated;
        Ok(())
    }
}

#[async_trait]
impl<T: StoredEntity> Creatable<T> for MemoryStore<T> {
    async fn create(&self, data: &T) -> ScaffoldResult<T> {
        let mut created = data.clone();
        created.set_id(self.next_id.fetch_add(1, Ordering::SeqCst));
        created.set_deleted(false);
        self.items.write().await.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl<T: StoredEntity> SoftDeletable for MemoryStore<T> {
    async fn soft_delete(&self, id: EntityId) -> ScaffoldResult<()> {
        self.set_deleted(id, true).await
    }

    async fn undelete(&self, id: EntityId) -> ScaffoldResult<()> {
        self.set_deleted(id, false).await
    }
}

#[async_trait]
impl<T: StoredEntity> PermanentlyDeletable for MemoryStore<T> {
    async fn permanent_delete(&self, id: EntityId) -> ScaffoldResult<()> {
        let mut items = self.items.write().await;
        let position = items
            .iter()
            .position(|i| i.id() == id)
            .ok_or_else(|| self.not_found(id))?;
        items.remove(position);
        Ok(())
    }

    async fn delete_confirmation(&self, id: EntityId) -> ScaffoldResult<Option<DeleteConfirmation>> {
        let Some(preview) = &self.confirmation else {
            return Ok(None);
        };
        let item = self.get(id).await?;
        Ok(preview(&item))
    }
}
