//! Delete lifecycle: soft delete, undelete, and confirmed permanent delete
//!
//! State machine:
//!
//! ```text
//! Idle --handle_permanent_delete_click--> ConfirmOpen --confirm--> Deleting --ok--> Idle
//!                                              |                      |
//!                                              +--close--> Idle        +--err--> ConfirmOpen
//! ```
//!
//! `permanent_delete` is only reachable from `ConfirmOpen`, which is only
//! entered once a confirmation payload has been fetched or synthesized.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::ScaffoldResult;
use crate::services::ScaffoldContext;
use crate::traits::{DeleteHooks, EntityContract};
use crate::types::{DeleteConfirmation, EntityId};

/// Permanent delete dialog phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeletePhase {
    #[default]
    Idle,
    ConfirmOpen,
    Deleting,
}

#[derive(Debug, Default)]
struct DeleteState {
    phase: DeletePhase,
    deleting_id: Option<EntityId>,
    confirmation: Option<DeleteConfirmation>,
}

/// What the confirmation dialog should show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteDialog {
    pub id: EntityId,
    pub confirmation: DeleteConfirmation,
    /// Confirm pressed, waiting for the backend
    pub deleting: bool,
}

/// Delete lifecycle controller for one entity family
pub struct DeleteLifecycle<T> {
    contract: Arc<EntityContract<T>>,
    ctx: Arc<ScaffoldContext>,
    state: RwLock<DeleteState>,
}

impl<T: 'static> DeleteLifecycle<T> {
    #[must_use]
    pub fn new(contract: Arc<EntityContract<T>>, ctx: Arc<ScaffoldContext>) -> Self {
        Self {
            contract,
            ctx,
            state: RwLock::new(DeleteState::default()),
        }
    }

    pub fn phase(&self) -> DeletePhase {
        self.read().phase
    }

    pub fn deleting_id(&self) -> Option<EntityId> {
        self.read().deleting_id
    }

    pub fn confirmation(&self) -> Option<DeleteConfirmation> {
        self.read().confirmation.clone()
    }

    pub fn is_dialog_open(&self) -> bool {
        self.phase() != DeletePhase::Idle
    }

    pub fn dialog(&self) -> Option<DeleteDialog> {
        let state = self.read();
        Some(DeleteDialog {
            id: state.deleting_id?,
            confirmation: state.confirmation.clone()?,
            deleting: state.phase == DeletePhase::Deleting,
        })
    }

    /// Soft delete. Notifies, then re-raises failures so batch callers can count them.
    pub async fn handle_delete(&self, id: EntityId, hooks: &dyn DeleteHooks) -> ScaffoldResult<()> {
        let name = self.contract.entity_name();
        let result = match self.contract.soft_deleter() {
            Ok(deleter) => deleter.soft_delete(id).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                log::info!("{} {id} deleted", self.contract.entity_type());
                self.ctx.notify_success(format!("{name} deleted"));
                hooks.on_deleted(id).await;
                Ok(())
            }
            Err(e) => {
                e.log(&format!("delete {} {id}", self.contract.entity_type()));
                self.ctx.notify_error(format!("Failed to delete {name}: {e}"));
                Err(e)
            }
        }
    }

    /// Reverse a soft delete. Same error policy as `handle_delete`.
    pub async fn handle_undelete(&self, id: EntityId, hooks: &dyn DeleteHooks) -> ScaffoldResult<()> {
        let name = self.contract.entity_name();
        let result = match self.contract.soft_deleter() {
            Ok(deleter) => deleter.undelete(id).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                log::info!("{} {id} restored", self.contract.entity_type());
                self.ctx.notify_success(format!("{name} restored"));
                hooks.on_undeleted(id).await;
                Ok(())
            }
            Err(e) => {
                e.log(&format!("undelete {} {id}", self.contract.entity_type()));
                self.ctx.notify_error(format!("Failed to restore {name}: {e}"));
                Err(e)
            }
        }
    }

    /// Fetch (or synthesize) the confirmation and open the dialog.
    ///
    /// A failed fetch leaves the dialog closed.
    pub async fn handle_permanent_delete_click(&self, id: EntityId) {
        let name = self.contract.entity_name();
        let deleter = match self.contract.permanent_deleter() {
            Ok(deleter) => deleter,
            Err(e) => {
                e.log("permanent delete");
                self.ctx.notify_error(e.to_string());
                return;
            }
        };

        let confirmation = match deleter.delete_confirmation(id).await {
            Ok(Some(confirmation)) => confirmation,
            Ok(None) => DeleteConfirmation::generic(name),
            Err(e) => {
                e.log(&format!("delete confirmation for {} {id}", self.contract.entity_type()));
                self.ctx
                    .notify_error(format!("Failed to prepare delete of {name}: {e}"));
                return;
            }
        };

        let mut state = self.write();
        if state.phase == DeletePhase::Deleting {
            log::warn!("permanent delete already in flight, ignoring click on {id}");
            return;
        }
        state.phase = DeletePhase::ConfirmOpen;
        state.deleting_id = Some(id);
        state.confirmation = Some(confirmation);
    }

    /// Run the permanent delete for the id the dialog was opened with.
    ///
    /// No-op unless the dialog is open. On failure the dialog stays open.
    pub async fn handle_permanent_delete_confirm(&self, hooks: &dyn DeleteHooks) {
        let id = {
            let mut state = self.write();
            match (state.phase, state.deleting_id) {
                (DeletePhase::ConfirmOpen, Some(id)) => {
                    state.phase = DeletePhase::Deleting;
                    id
                }
                _ => {
                    log::warn!("permanent delete confirmed without an open dialog");
                    return;
                }
            }
        };

        let name = self.contract.entity_name();
        let result = match self.contract.permanent_deleter() {
            Ok(deleter) => deleter.permanent_delete(id).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                *self.write() = DeleteState::default();
                log::info!("{} {id} permanently deleted", self.contract.entity_type());
                self.ctx.notify_success(format!("{name} permanently deleted"));
                hooks.on_permanently_deleted(id).await;
            }
            Err(e) => {
                {
                    let mut state = self.write();
                    if state.phase == DeletePhase::Deleting && state.deleting_id == Some(id) {
                        state.phase = DeletePhase::ConfirmOpen;
                    }
                }
                e.log(&format!("permanent delete {} {id}", self.contract.entity_type()));
                self.ctx
                    .notify_error(format!("Failed to permanently delete {name}: {e}"));
            }
        }
    }

    /// Close the dialog and discard the confirmation. Ignored while deleting.
    pub fn handle_delete_modal_close(&self) {
        let mut state = self.write();
        if state.phase == DeletePhase::Deleting {
            log::debug!("delete dialog close ignored while deleting");
            return;
        }
        *state = DeleteState::default();
    }

    fn read(&self) -> RwLockReadGuard<'_, DeleteState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, DeleteState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
