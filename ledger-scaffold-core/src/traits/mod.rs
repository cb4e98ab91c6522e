//! Entity contract and collaborator trait definitions

mod contract;
mod delete_hooks;
mod entity_source;
mod notifier;

pub use contract::{EntityActions, EntityContract, EntityContractBuilder};
pub use delete_hooks::{DeleteHooks, NoopDeleteHooks};
pub use entity_source::{Creatable, EntitySource, PermanentlyDeletable, SoftDeletable, Updatable};
pub use notifier::{Notifier, NoopNotifier};
