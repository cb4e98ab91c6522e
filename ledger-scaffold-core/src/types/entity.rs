//! Entity identity and capability types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Numeric entity identifier
pub type EntityId = i64;

/// Entity family
///
/// The lowercase key is stable: it names reload topics and is what hosts persist
/// in their own routing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Work,
    Organization,
    Submission,
    Collection,
    Note,
}

impl EntityType {
    /// All entity families, in menu order.
    pub const ALL: [Self; 5] = [
        Self::Work,
        Self::Organization,
        Self::Submission,
        Self::Collection,
        Self::Note,
    ];

    /// Stable lowercase key
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Organization => "organization",
            Self::Submission => "submission",
            Self::Collection => "collection",
            Self::Note => "note",
        }
    }

    /// Reload topic name, e.g. `work:reload`
    pub fn reload_topic(self) -> String {
        format!("{}:reload", self.as_str())
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown entity type: {s}"))
    }
}

/// An item managed by an entity contract.
///
/// `field` backs free-text search and column sorting. The default reads the key
/// from the type's serde representation, so column keys are serialized field names.
pub trait Entity: Serialize + Clone + Send + Sync + 'static {
    fn id(&self) -> EntityId;

    /// Soft-deleted rows are hidden from lists unless deleted rows are shown.
    fn is_deleted(&self) -> bool {
        false
    }

    /// Display label used for breadcrumbs.
    fn label(&self) -> Option<String> {
        None
    }

    fn field(&self, key: &str) -> Value {
        match serde_json::to_value(self) {
            Ok(Value::Object(mut map)) => map.remove(key).unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }
}

/// Optional remote action an entity contract may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    Update,
    Create,
    SoftDelete,
    PermanentDelete,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Update => "update",
            Self::Create => "create",
            Self::SoftDelete => "soft delete",
            Self::PermanentDelete => "permanent delete",
        };
        f.write_str(s)
    }
}

/// Capabilities carried by a contract
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct CapabilitySet {
    pub update: bool,
    pub create: bool,
    pub soft_delete: bool,
    pub permanent_delete: bool,
}

impl CapabilitySet {
    pub fn contains(&self, capability: Capability) -> bool {
        match capability {
            Capability::Update => self.update,
            Capability::Create => self.create,
            Capability::SoftDelete => self.soft_delete,
            Capability::PermanentDelete => self.permanent_delete,
        }
    }
}
