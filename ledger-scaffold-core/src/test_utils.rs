//! Test helpers
//!
//! In-memory entity store with failure injection and call counters, plus
//! recording notifier/hook implementations and a ready-made work contract.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{oneshot, Notify, RwLock};

use crate::config::ScaffoldConfig;
use crate::error::{ScaffoldError, ScaffoldResult};
use crate::services::ScaffoldContext;
use crate::traits::{
    Creatable, DeleteHooks, EntityContract, EntitySource, Notifier, PermanentlyDeletable,
    SoftDeletable, Updatable,
};
use crate::types::{
    ColumnDef, DeleteConfirmation, Entity, EntityId, EntityType, Notification, NotificationKind,
};

// ===== TestWork =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestWork {
    pub id: EntityId,
    pub title: String,
    pub genre: Option<String>,
    pub word_count: Option<u32>,
    pub is_deleted: bool,
    pub tags: Vec<String>,
}

impl Entity for TestWork {
    fn id(&self) -> EntityId {
        self.id
    }

    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn label(&self) -> Option<String> {
        Some(self.title.clone())
    }
}

/// Record types the mock store can hold
pub trait MockRecord: Entity {
    const ENTITY_TYPE: EntityType;

    fn with_id(self, id: EntityId) -> Self;

    fn set_deleted(&mut self, deleted: bool);
}

impl MockRecord for TestWork {
    const ENTITY_TYPE: EntityType = EntityType::Work;

    fn with_id(mut self, id: EntityId) -> Self {
        self.id = id;
        self
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.is_deleted = deleted;
    }
}

pub fn work(id: EntityId, title: &str) -> TestWork {
    TestWork {
        id,
        title: title.to_string(),
        genre: None,
        word_count: None,
        is_deleted: false,
        tags: Vec::new(),
    }
}

pub fn deleted_work(id: EntityId, title: &str) -> TestWork {
    TestWork {
        is_deleted: true,
        ..work(id, title)
    }
}

// ===== MockEntityStore =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockAction {
    List,
    Get,
    Update,
    Create,
    SoftDelete,
    Undelete,
    PermanentDelete,
    Confirmation,
}

pub struct MockEntityStore<T> {
    items: RwLock<Vec<T>>,
    failures: RwLock<HashSet<MockAction>>,
    confirmation: RwLock<Option<DeleteConfirmation>>,
    gates: tokio::sync::Mutex<HashMap<MockAction, oneshot::Receiver<()>>>,
    calls: Mutex<HashMap<MockAction, usize>>,
    next_id: AtomicI64,
    /// Fired after every completed `list()`
    pub listed: Notify,
}

impl<T: MockRecord> MockEntityStore<T> {
    pub fn new(items: Vec<T>) -> Self {
        let next_id = items.iter().map(Entity::id).max().unwrap_or(0) + 1;
        Self {
            items: RwLock::new(items),
            failures: RwLock::new(HashSet::new()),
            confirmation: RwLock::new(None),
            gates: tokio::sync::Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(next_id),
            listed: Notify::new(),
        }
    }

    pub fn calls(&self, action: MockAction) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&action)
            .copied()
            .unwrap_or(0)
    }

    /// Make every later call of `action` fail
    pub async fn fail(&self, action: MockAction) {
        self.failures.write().await.insert(action);
    }

    pub async fn recover(&self, action: MockAction) {
        self.failures.write().await.remove(&action);
    }

    pub async fn set_confirmation(&self, confirmation: Option<DeleteConfirmation>) {
        *self.confirmation.write().await = confirmation;
    }

    pub async fn item(&self, id: EntityId) -> Option<T> {
        self.items.read().await.iter().find(|i| i.id() == id).cloned()
    }

    pub async fn remove(&self, id: EntityId) {
        self.items.write().await.retain(|i| i.id() != id);
    }

    pub async fn replace_all(&self, items: Vec<T>) {
        *self.items.write().await = items;
    }

    /// Hold the next `list()` or `get()` until the returned sender fires.
    ///
    /// The held call reads the items before waiting.
    pub async fn gate_next(&self, action: MockAction) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().await.insert(action, rx);
        tx
    }

    async fn wait_gate(&self, action: MockAction) {
        let gate = self.gates.lock().await.remove(&action);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
    }

    async fn enter(&self, action: MockAction) -> ScaffoldResult<()> {
        *self
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(action)
            .or_default() += 1;
        if self.failures.read().await.contains(&action) {
            return Err(ScaffoldError::backend(
                T::ENTITY_TYPE,
                format!("injected {action:?} failure"),
            ));
        }
        Ok(())
    }

    fn not_found(id: EntityId) -> ScaffoldError {
        ScaffoldError::NotFound {
            entity_type: T::ENTITY_TYPE,
            id,
        }
    }

    async fn modify(&self, id: EntityId, f: impl FnOnce(&mut T)) -> ScaffoldResult<()> {
        let mut items = self.items.write().await;
        let item = items
            .iter_mut()
            .find(|i| i.id() == id)
            .ok_or_else(|| Self::not_found(id))?;
        f(item);
        Ok(())
    }
}

#[async_trait]
impl<T: MockRecord> EntitySource<T> for MockEntityStore<T> {
    async fn list(&self) -> ScaffoldResult<Vec<T>> {
        let result = self.enter(MockAction::List).await;
        let snapshot = self.items.read().await.clone();
        self.wait_gate(MockAction::List).await;
        self.listed.notify_waiters();
        result.map(|()| snapshot)
    }

    async fn get(&self, id: EntityId) -> ScaffoldResult<T> {
        self.enter(MockAction::Get).await?;
        let item = self.item(id).await;
        self.wait_gate(MockAction::Get).await;
        item.ok_or_else(|| Self::not_found(id))
    }
}

#[async_trait]
impl<T: MockRecord> Updatable<T> for MockEntityStore<T> {
    async fn update(&self, id: EntityId, patch: &T) -> ScaffoldResult<()> {
        self.enter(MockAction::Update).await?;
        let patch = patch.clone().with_id(id);
        self.modify(id, |item| *item = patch).await
    }
}

#[async_trait]
impl<T: MockRecord> Creatable<T> for MockEntityStore<T> {
    async fn create(&self, data: &T) -> ScaffoldResult<T> {
        self.enter(MockAction::Create).await?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created = data.clone().with_id(id);
        self.items.write().await.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl<T: MockRecord> SoftDeletable for MockEntityStore<T> {
    async fn soft_delete(&self, id: EntityId) -> ScaffoldResult<()> {
        self.enter(MockAction::SoftDelete).await?;
        self.modify(id, |item| item.set_deleted(true)).await
    }

    async fn undelete(&self, id: EntityId) -> ScaffoldResult<()> {
        self.enter(MockAction::Undelete).await?;
        self.modify(id, |item| item.set_deleted(false)).await
    }
}

#[async_trait]
impl<T: MockRecord> PermanentlyDeletable for MockEntityStore<T> {
    async fn permanent_delete(&self, id: EntityId) -> ScaffoldResult<()> {
        self.enter(MockAction::PermanentDelete).await?;
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|i| i.id() != id);
        if items.len() == before {
            return Err(Self::not_found(id));
        }
        Ok(())
    }

    async fn delete_confirmation(&self, _id: EntityId) -> ScaffoldResult<Option<DeleteConfirmation>> {
        self.enter(MockAction::Confirmation).await?;
        Ok(self.confirmation.read().await.clone())
    }
}

/// Work contract with every capability over a fresh mock store
pub fn work_contract(
    items: Vec<TestWork>,
) -> (Arc<EntityContract<TestWork>>, Arc<MockEntityStore<TestWork>>) {
    let store = Arc::new(MockEntityStore::new(items));
    let contract = EntityContract::builder(EntityType::Work, "Work", "Works", store.clone())
        .columns([
            ColumnDef::new("title", "Title"),
            ColumnDef::new("genre", "Genre"),
            ColumnDef::new("wordCount", "Words"),
            ColumnDef::new("tags", "Tags").not_sortable(),
        ])
        .updatable(store.clone())
        .creatable(store.clone())
        .soft_deletable(store.clone())
        .permanently_deletable(store.clone())
        .build()
        .unwrap();
    (Arc::new(contract), store)
}

// ===== RecordingNotifier =====

#[derive(Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn kinds(&self) -> Vec<NotificationKind> {
        self.notifications().into_iter().map(|n| n.kind).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

pub fn test_context() -> (Arc<ScaffoldContext>, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let ctx = ScaffoldContext::new(notifier.clone(), ScaffoldConfig::default());
    (Arc::new(ctx), notifier)
}

// ===== RecordingHooks =====

#[derive(Default)]
pub struct RecordingHooks {
    deleted: Mutex<Vec<EntityId>>,
    undeleted: Mutex<Vec<EntityId>>,
    permanently_deleted: Mutex<Vec<EntityId>>,
}

impl RecordingHooks {
    pub fn deleted(&self) -> Vec<EntityId> {
        Self::get(&self.deleted)
    }

    pub fn undeleted(&self) -> Vec<EntityId> {
        Self::get(&self.undeleted)
    }

    pub fn permanently_deleted(&self) -> Vec<EntityId> {
        Self::get(&self.permanently_deleted)
    }

    fn get(ids: &Mutex<Vec<EntityId>>) -> Vec<EntityId> {
        ids.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn push(ids: &Mutex<Vec<EntityId>>, id: EntityId) {
        ids.lock().unwrap_or_else(PoisonError::into_inner).push(id);
    }
}

#[async_trait]
impl DeleteHooks for RecordingHooks {
    async fn on_deleted(&self, id: EntityId) {
        Self::push(&self.deleted, id);
    }

    async fn on_undeleted(&self, id: EntityId) {
        Self::push(&self.undeleted, id);
    }

    async fn on_permanently_deleted(&self, id: EntityId) {
        Self::push(&self.permanently_deleted, id);
    }
}
