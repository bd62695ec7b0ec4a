// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::picker::traits::DirectoryPicker;

/// OS folder dialog
pub struct NativeDirectoryPicker {
    title: String,
}

impl NativeDirectoryPicker {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into() }
    }
}

impl Default for NativeDirectoryPicker {
    fn default() -> Self {
        Self::new("Select save directory")
    }
}

#[async_trait]
impl DirectoryPicker for NativeDirectoryPicker {
    async fn pick(&self, start: Option<&Path>) -> Option<PathBuf> {
        let mut dialog = rfd::AsyncFileDialog::new().set_title(&self.title);
        if let Some(start) = start.filter(|p| p.is_dir()) {
            dialog = dialog.set_directory(start);
        }

        let picked = dialog
            .pick_folder()
            .await
            .map(|handle| handle.path().to_path_buf());

        match picked {
            Some(ref path) => info!(path = %path.display(), "Directory selected"),
            None => info!("Directory selection cancelled"),
        }
        picked
    }
}
