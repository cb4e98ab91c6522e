//! Ledger Scaffold Core Library
//!
//! Hierarchical navigation and generic entity scaffolding for master-detail
//! screens:
//! - Navigation stack (drill-down levels with prev/next/home/end)
//! - Entity contracts (required source plus optional capabilities)
//! - List, detail and page controllers with a shared delete lifecycle
//!
//! The library holds no storage of its own. Every remote action comes in
//! through the traits in [`traits`], so any backend can drive it.

pub mod config;
pub mod error;
pub mod services;
pub mod traits;
pub mod types;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use config::ScaffoldConfig;
pub use error::{ScaffoldError, ScaffoldResult};
pub use services::{
    DetailController, ListController, NavigationScope, PageController, ReloadBus, ScaffoldContext,
};
pub use traits::{EntityContract, EntitySource, Notifier};
