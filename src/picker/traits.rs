// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[async_trait]
pub trait DirectoryPicker: Send + Sync {
    /// Ask the user for a directory; `None` means the dialog was cancelled
    async fn pick(&self, start: Option<&Path>) -> Option<PathBuf>;
}
