//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

use crate::types::{Capability, EntityId, EntityType};

/// Scaffold layer error type
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum ScaffoldError {
    /// Entity not found
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: EntityType, id: EntityId },

    /// A remote action rejected
    #[error("{entity_type} backend error: {message}")]
    Backend {
        entity_type: EntityType,
        message: String,
    },

    /// The entity contract does not carry this capability
    #[error("{entity_type} does not support {capability}")]
    Unsupported {
        entity_type: EntityType,
        capability: Capability,
    },

    /// Operation is not valid in the controller's current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Nothing is selected
    #[error("No item selected")]
    NoSelection,

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ScaffoldError {
    /// Shorthand for a backend failure.
    pub fn backend(entity_type: EntityType, message: impl Into<String>) -> Self {
        Self::Backend {
            entity_type,
            message: message.into(),
        }
    }

    /// Whether it is expected behavior (user input, missing record, absent capability).
    ///
    /// Use `warn` when this returns `true` and `error` when it returns `false`.
    /// **Update this method when new variants are added.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::Unsupported { .. }
                | Self::NoSelection
                | Self::Validation(_)
                | Self::InvalidState(_)
        )
    }

    /// Log this error at the level `is_expected` selects.
    pub(crate) fn log(&self, context: &str) {
        if self.is_expected() {
            log::warn!("{context}: {self}");
        } else {
            log::error!("{context}: {self}");
        }
    }
}

impl From<serde_json::Error> for ScaffoldError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Scaffold layer Result type alias
pub type ScaffoldResult<T> = std::result::Result<T, ScaffoldError>;
