//! Type definitions

mod delete;
mod entity;
mod list;
mod navigation;
mod notification;

pub use delete::{BatchDeleteFailure, BatchDeleteResult, DeleteConfirmation};
pub use entity::{Capability, CapabilitySet, Entity, EntityId, EntityType};
pub use list::{ColumnDef, KeyOutcome, ListKey, SortDirection, SortSpec};
pub use navigation::{Breadcrumb, NavDirection, NavItem, NavigationEvent, NavigationLevel};
pub use notification::{Notification, NotificationKind};
