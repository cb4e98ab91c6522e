//! List view types: columns, sorting, keyboard

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Column metadata. Presentation details stay with the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    /// Serialized field name on the entity
    pub key: String,
    pub label: String,
    pub sortable: bool,
    pub searchable: bool,
}

impl ColumnDef {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            sortable: true,
            searchable: true,
        }
    }

    #[must_use]
    pub fn not_sortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    #[must_use]
    pub fn not_searchable(mut self) -> Self {
        self.searchable = false;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Single-field sort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

/// Keys the list surface reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKey {
    ArrowUp,
    ArrowDown,
    Home,
    End,
    Enter,
}

impl FromStr for ListKey {
    type Err = String;

    /// Parses DOM-style key names (`ArrowDown`, `Home`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ArrowUp" => Ok(Self::ArrowUp),
            "ArrowDown" => Ok(Self::ArrowDown),
            "Home" => Ok(Self::Home),
            "End" => Ok(Self::End),
            "Enter" => Ok(Self::Enter),
            other => Err(format!("unhandled key: {other}")),
        }
    }
}

/// Result of a key press on the list surface
#[derive(Debug, Clone, PartialEq)]
pub struct KeyOutcome<T> {
    /// Host should suppress the default action (scrolling)
    pub prevent_default: bool,
    /// Row activated by Enter
    pub activated: Option<T>,
}

impl<T> KeyOutcome<T> {
    pub(crate) fn handled() -> Self {
        Self {
            prevent_default: true,
            activated: None,
        }
    }

    pub(crate) fn activate(item: T) -> Self {
        Self {
            prevent_default: true,
            activated: Some(item),
        }
    }
}
