//! Ready-made adapters for hosts without their own toast layer or backend.

mod log_notifier;
mod memory_store;

pub use log_notifier::LogNotifier;
pub use memory_store::{MemoryStore, StoredEntity};
