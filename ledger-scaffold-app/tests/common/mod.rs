//! Shared fixtures for the integration tests: collections, works and
//! submissions over in-memory stores.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ledger_scaffold_app::adapters::{MemoryStore, StoredEntity};
use ledger_scaffold_core::error::ScaffoldResult;
use ledger_scaffold_core::traits::{EntityContract, EntitySource, Notifier};
use ledger_scaffold_core::types::{
    ColumnDef, DeleteConfirmation, Entity, EntityId, EntityType, NavItem, Notification,
    NotificationKind,
};
use serde::Serialize;
use tokio::sync::Notify;

macro_rules! stored_entity {
    ($ty:ty, $label:ident) => {
        impl Entity for $ty {
            fn id(&self) -> EntityId {
                self.id
            }

            fn is_deleted(&self) -> bool {
                self.is_deleted
            }

            fn label(&self) -> Option<String> {
                Some(self.$label.to_string())
            }
        }

        impl StoredEntity for $ty {
            fn set_id(&mut self, id: EntityId) {
                self.id = id;
            }

            fn set_deleted(&mut self, deleted: bool) {
                self.is_deleted = deleted;
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: EntityId,
    pub name: String,
    pub is_deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    pub id: EntityId,
    pub title: String,
    pub collection_id: Option<EntityId>,
    pub word_count: Option<u32>,
    pub is_deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: EntityId,
    pub work_id: EntityId,
    pub venue: String,
    pub is_deleted: bool,
}

stored_entity!(Collection, name);
stored_entity!(Work, title);
stored_entity!(Submission, venue);

pub fn collection(id: EntityId, name: &str) -> Collection {
    Collection {
        id,
        name: name.to_string(),
        is_deleted: false,
    }
}

pub fn work(id: EntityId, title: &str, collection_id: Option<EntityId>) -> Work {
    Work {
        id,
        title: title.to_string(),
        collection_id,
        word_count: None,
        is_deleted: false,
    }
}

pub fn submission(id: EntityId, work_id: EntityId, venue: &str) -> Submission {
    Submission {
        id,
        work_id,
        venue: venue.to_string(),
        is_deleted: false,
    }
}

pub fn nav_items<T: Entity>(items: &[T]) -> Vec<NavItem> {
    items.iter().map(NavItem::from_entity).collect()
}

/// `EntitySource` wrapper counting `list()` calls
pub struct CountingSource<T> {
    inner: Arc<MemoryStore<T>>,
    lists: AtomicUsize,
    pub listed: Notify,
}

impl<T: StoredEntity> CountingSource<T> {
    pub fn new(inner: Arc<MemoryStore<T>>) -> Self {
        Self {
            inner,
            lists: AtomicUsize::new(0),
            listed: Notify::new(),
        }
    }

    pub fn list_calls(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T: StoredEntity> EntitySource<T> for CountingSource<T> {
    async fn list(&self) -> ScaffoldResult<Vec<T>> {
        let result = self.inner.list().await;
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.listed.notify_waiters();
        result
    }

    async fn get(&self, id: EntityId) -> ScaffoldResult<T> {
        self.inner.get(id).await
    }
}

pub struct WorksFixture {
    pub store: Arc<MemoryStore<Work>>,
    pub source: Arc<CountingSource<Work>>,
    pub contract: Arc<EntityContract<Work>>,
}

/// Works contract whose permanent-delete preview counts submissions
pub fn works_fixture(works: Vec<Work>, submissions: &[Submission]) -> WorksFixture {
    let counts: Vec<(EntityId, usize)> = works
        .iter()
        .map(|w| (w.id, submissions.iter().filter(|s| s.work_id == w.id).count()))
        .collect();
    let store = Arc::new(
        MemoryStore::new(EntityType::Work, works).with_confirmation(move |w: &Work| {
            let count = counts
                .iter()
                .find(|(id, _)| *id == w.id)
                .map_or(0, |(_, n)| *n);
            (count > 0).then(|| DeleteConfirmation {
                title: format!("Delete \"{}\"?", w.title),
                message: "The work and everything attached to it will be removed.".to_string(),
                consequences: vec![format!("{count} submission(s)")],
                confirm_label: Some("Delete work".to_string()),
            })
        }),
    );
    let source = Arc::new(CountingSource::new(Arc::clone(&store)));
    let contract = EntityContract::builder(EntityType::Work, "Work", "Works", Arc::clone(&source))
        .columns([
            ColumnDef::new("title", "Title"),
            ColumnDef::new("wordCount", "Words"),
            ColumnDef::new("collectionId", "Collection").not_searchable(),
        ])
        .updatable(Arc::clone(&store))
        .creatable(Arc::clone(&store))
        .soft_deletable(Arc::clone(&store))
        .permanently_deletable(Arc::clone(&store))
        .build()
        .expect("works contract");
    WorksFixture {
        store,
        source,
        contract: Arc::new(contract),
    }
}

pub fn collections_contract(
    collections: Vec<Collection>,
) -> (Arc<EntityContract<Collection>>, Arc<MemoryStore<Collection>>) {
    let store = Arc::new(MemoryStore::new(EntityType::Collection, collections));
    let contract = store
        .contract_builder("Collection", "Collections")
        .column(ColumnDef::new("name", "Name"))
        .build()
        .expect("collections contract");
    (Arc::new(contract), store)
}

pub fn submissions_contract(
    submissions: Vec<Submission>,
) -> (Arc<EntityContract<Submission>>, Arc<MemoryStore<Submission>>) {
    let store = Arc::new(MemoryStore::new(EntityType::Submission, submissions));
    let contract = store
        .contract_builder("Submission", "Submissions")
        .column(ColumnDef::new("venue", "Venue"))
        .build()
        .expect("submissions contract");
    (Arc::new(contract), store)
}

#[derive(Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn kinds(&self) -> Vec<NotificationKind> {
        self.notifications
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.kind)
            .collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notifications
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

/// Poll `done` until it holds; panics after one second.
pub async fn wait_for(mut done: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(1), async {
        while !done() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
