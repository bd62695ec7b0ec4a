// SPDX-License-Identifier: GPL-3.0-only
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Preferences remembered between runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Directory picked most recently, unset until the user chooses one
    #[serde(
        rename = "lastSaveLocation",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_save_location: Option<PathBuf>,
}

impl Settings {
    pub fn with_save_location(path: impl Into<PathBuf>) -> Self {
        Self {
            last_save_location: Some(path.into()),
        }
    }
}
