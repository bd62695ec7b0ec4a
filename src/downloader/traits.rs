// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use crate::downloader::error::DownloadError;
use crate::downloader::models::{DownloadRequest, ProgressEvent};

/// Receives progress while an item downloads
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

#[async_trait]
pub trait ItemDownloader: Send + Sync {
    /// Download one workshop item into `request.target_directory`
    async fn download_item(
        &self,
        request: &DownloadRequest,
        progress: &dyn ProgressReporter,
    ) -> Result<(), DownloadError>;
}
