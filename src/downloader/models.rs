// SPDX-License-Identifier: GPL-3.0-only
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::accounts::Account;
use crate::links::WorkshopId;

/// One workshop item to fetch with one account
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub workshop_id: WorkshopId,
    pub account: Account,

    /// `<base save path>/<workshop id>`
    pub target_directory: PathBuf,
}

impl DownloadRequest {
    pub fn new(workshop_id: WorkshopId, account: Account, base_save_path: &Path) -> Self {
        let target_directory = base_save_path.join(workshop_id.as_str());
        Self {
            workshop_id,
            account,
            target_directory,
        }
    }
}

/// Progress of the item currently downloading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub workshop_id: WorkshopId,

    /// Percentage, 0 to 100
    pub progress: u8,

    pub message: String,
}
