//! Scaffold configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ScaffoldError, ScaffoldResult};

/// Scaffold configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScaffoldConfig {
    /// Initial value of the page-level "show deleted" toggle
    pub show_deleted_by_default: bool,
    /// Buffered reload signals per subscriber before lagging
    pub reload_channel_capacity: usize,
    /// Emit success toasts for completed mutations
    pub notify_on_success: bool,
    /// Searches shorter than this are ignored
    pub search_min_chars: usize,
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            show_deleted_by_default: false,
            reload_channel_capacity: 64,
            notify_on_success: true,
            search_min_chars: 0,
        }
    }
}

impl ScaffoldConfig {
    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> ScaffoldResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ScaffoldError::Config(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file
    pub fn load(path: impl AsRef<Path>) -> ScaffoldResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ScaffoldError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> ScaffoldResult<()> {
        if self.reload_channel_capacity == 0 {
            return Err(ScaffoldError::Config(
                "reloadChannelCapacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
