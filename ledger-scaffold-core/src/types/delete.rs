//! Delete related types

use serde::{Deserialize, Serialize};

use super::entity::EntityId;

/// Preview of what a permanent delete will remove.
///
/// Produced by the backend on demand; never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteConfirmation {
    pub title: String,
    pub message: String,
    /// Cascading effects (note counts, submissions, collection memberships, files)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consequences: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_label: Option<String>,
}

impl DeleteConfirmation {
    /// Confirmation used when the contract offers no preview
    pub fn generic(entity_name: &str) -> Self {
        Self {
            title: format!("Permanently delete {entity_name}?"),
            message: format!(
                "This {} will be permanently deleted. This cannot be undone.",
                entity_name.to_lowercase()
            ),
            consequences: Vec::new(),
            confirm_label: Some("Delete permanently".to_string()),
        }
    }
}

/// Per-item failure in a batch delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeleteFailure {
    pub id: EntityId,
    pub reason: String,
}

/// Batch delete result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeleteResult {
    pub success_count: usize,
    pub failures: Vec<BatchDeleteFailure>,
}
