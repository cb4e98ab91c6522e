//! Page controller: one list and one detail behind a single view mode

use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::services::{
    DetailController, ListController, NavigationScope, ReloadOutcome, ReloadWatcher,
    ScaffoldContext,
};
use crate::traits::EntityContract;
use crate::types::{Entity, EntityId, EntityType, NavDirection};

/// Page view mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "id", rename_all = "camelCase")]
pub enum PageView {
    #[default]
    List,
    Detail(EntityId),
    Create,
}

/// Background tasks of a mounted page.
///
/// Reloads the list and the open detail on reload signals and re-points an
/// open detail at the scope's selection. Dropping it unmounts the page.
#[derive(Debug)]
pub struct PageWatchers {
    list: ReloadWatcher,
    detail: ReloadWatcher,
    follower: Option<JoinHandle<()>>,
}

impl PageWatchers {
    pub fn is_finished(&self) -> bool {
        self.list.is_finished()
            && self.detail.is_finished()
            && self.follower.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for PageWatchers {
    fn drop(&mut self) {
        if let Some(follower) = &self.follower {
            follower.abort();
        }
    }
}

/// Page controller
///
/// Owns a fresh navigation scope shared by its list and detail controllers,
/// so selection never leaks into another page. `view()` and the detail
/// controller always point at the same id; a permanent delete from the
/// detail view returns to the list.
pub struct PageController<T> {
    entity_type: EntityType,
    navigation: NavigationScope,
    list: Arc<ListController<T>>,
    detail: Arc<DetailController<T>>,
    view: Arc<RwLock<PageView>>,
    selection_changes: Mutex<Option<mpsc::UnboundedReceiver<()>>>,
}

impl<T: Entity> PageController<T> {
    #[must_use]
    pub fn new(contract: Arc<EntityContract<T>>, ctx: Arc<ScaffoldContext>) -> Self {
        let entity_type = contract.entity_type();
        let navigation = NavigationScope::new();
        let view = Arc::new(RwLock::new(PageView::List));

        let list = Arc::new(ListController::new(
            Arc::clone(&contract),
            Arc::clone(&ctx),
            navigation.clone(),
        ));
        let detail = Arc::new(DetailController::new(contract, ctx, navigation.clone()));

        let (changed, selection_changes) = mpsc::unbounded_channel();
        navigation.set_on_navigate(move |event| {
            if event.entity_type == entity_type {
                let _ = changed.send(());
            }
        });

        let closer = Arc::clone(&view);
        detail.set_on_close(move || {
            *closer.write().unwrap_or_else(PoisonError::into_inner) = PageView::List;
        });

        Self {
            entity_type,
            navigation,
            list,
            detail,
            view,
            selection_changes: Mutex::new(Some(selection_changes)),
        }
    }

    /// Start the page's background tasks; dropping the result unmounts it.
    ///
    /// Must run inside a tokio runtime. Only the first call follows the selection.
    pub fn mount(self: &Arc<Self>) -> PageWatchers {
        let receiver = self
            .selection_changes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if receiver.is_none() {
            log::warn!("{} page mounted twice", self.entity_type);
        }
        PageWatchers {
            list: self.list.watch_reloads(),
            detail: self.detail.watch_reloads(),
            follower: receiver.map(|rx| spawn_follower(rx, Arc::downgrade(self))),
        }
    }

    pub fn view(&self) -> PageView {
        *self.view.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn navigation(&self) -> &NavigationScope {
        &self.navigation
    }

    pub fn list(&self) -> &Arc<ListController<T>> {
        &self.list
    }

    pub fn detail(&self) -> &Arc<DetailController<T>> {
        &self.detail
    }

    pub fn show_deleted(&self) -> bool {
        self.list.show_deleted()
    }

    pub fn set_show_deleted(&self, show_deleted: bool) {
        self.list.set_show_deleted(show_deleted);
    }

    /// Switch to the detail of `id` and load it.
    pub async fn open_detail(&self, id: EntityId) -> ReloadOutcome {
        self.point_detail(id);
        self.navigation.set_current_id(id);
        self.detail.reload().await
    }

    /// Switch to create mode with `template` as the new draft.
    pub fn open_create(&self, template: T) {
        self.set_view(PageView::Create);
        self.detail.begin_create(template);
    }

    /// Back to the list, dropping the detail state.
    pub fn close_detail(&self) {
        self.set_view(PageView::List);
        self.detail.clear();
    }

    /// Traverse from the open detail and load the new sibling.
    pub async fn navigate(&self, direction: NavDirection) -> Option<EntityId> {
        if !matches!(self.view(), PageView::Detail(_)) {
            return None;
        }
        let id = self.detail.go(direction)?;
        self.point_detail(id);
        self.detail.reload().await;
        Some(id)
    }

    /// Create the drafted entity and open its detail.
    pub async fn save_new(&self) -> Option<EntityId> {
        if self.view() != PageView::Create {
            log::warn!("save_new called outside create mode");
            return None;
        }
        let id = self.detail.handle_create().await?;
        self.list.reload().await;
        self.set_view(PageView::Detail(id));
        self.navigation.set_current_id(id);
        Some(id)
    }

    /// Re-point an open detail at the scope's current selection.
    async fn follow_selection(&self) {
        let PageView::Detail(shown) = self.view() else {
            return;
        };
        let Some(level) = self.navigation.current_level() else {
            return;
        };
        let Some(id) = level.current_id else {
            return;
        };
        if level.entity_type != self.entity_type || (shown == id && self.detail.id() == Some(id)) {
            return;
        }
        if self.detail.is_editing() {
            log::debug!(
                "{} {shown} has an open draft, not following selection to {id}",
                self.entity_type
            );
            return;
        }
        self.point_detail(id);
        self.detail.reload().await;
    }

    fn point_detail(&self, id: EntityId) {
        self.detail.point_at(id);
        self.set_view(PageView::Detail(id));
    }

    fn set_view(&self, view: PageView) {
        *self.view.write().unwrap_or_else(PoisonError::into_inner) = view;
    }
}

fn spawn_follower<T: Entity>(
    mut changes: mpsc::UnboundedReceiver<()>,
    page: Weak<PageController<T>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while changes.recv().await.is_some() {
            while changes.try_recv().is_ok() {}
            let Some(page) = page.upgrade() else {
                break;
            };
            page.follow_selection().await;
        }
    })
}
