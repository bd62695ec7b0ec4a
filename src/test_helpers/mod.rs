// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::downloader::{DownloadError, DownloadRequest, ItemDownloader, ProgressEvent, ProgressReporter};
use crate::picker::DirectoryPicker;
use crate::settings::{Settings, SettingsStore};

/// Collects every progress event it is given
#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressReporter for RecordingReporter {
    fn report(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Item downloader that records calls and tracks how many run at once
#[derive(Default)]
pub struct FakeDownloader {
    failing: HashSet<String>,
    delay: Duration,
    calls: Mutex<Vec<(String, PathBuf)>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl FakeDownloader {
    pub fn failing(ids: &[&str]) -> Self {
        Self {
            failing: ids.iter().map(|id| id.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn target_dirs(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().iter().map(|(_, dir)| dir.clone()).collect()
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ItemDownloader for FakeDownloader {
    async fn download_item(
        &self,
        request: &DownloadRequest,
        progress: &dyn ProgressReporter,
    ) -> Result<(), DownloadError> {
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);
        self.calls.lock().unwrap().push((
            request.workshop_id.to_string(),
            request.target_directory.clone(),
        ));

        progress.report(ProgressEvent {
            workshop_id: request.workshop_id.clone(),
            progress: 50,
            message: "Downloading scene.pkg".to_string(),
        });
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let result = if self.failing.contains(request.workshop_id.as_str()) {
            Err(DownloadError::ProcessFailure { code: Some(1) })
        } else {
            progress.report(ProgressEvent {
                workshop_id: request.workshop_id.clone(),
                progress: 100,
                message: "Download complete".to_string(),
            });
            Ok(())
        };

        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Settings store kept in memory
#[derive(Default)]
pub struct MemorySettingsStore {
    settings: Mutex<Settings>,
    saves: AtomicUsize,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Mutex::new(settings),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Settings {
        self.settings.lock().unwrap().clone()
    }

    async fn save(&self, settings: &Settings) -> anyhow::Result<()> {
        *self.settings.lock().unwrap() = settings.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Picker that answers with a preset result
pub struct FixedDirectoryPicker {
    answer: Option<PathBuf>,
    last_start: Mutex<Option<PathBuf>>,
}

impl FixedDirectoryPicker {
    pub fn new(answer: Option<PathBuf>) -> Self {
        Self {
            answer,
            last_start: Mutex::new(None),
        }
    }

    pub fn last_start(&self) -> Option<PathBuf> {
        self.last_start.lock().unwrap().clone()
    }
}

#[async_trait]
impl DirectoryPicker for FixedDirectoryPicker {
    async fn pick(&self, start: Option<&Path>) -> Option<PathBuf> {
        *self.last_start.lock().unwrap() = start.map(Path::to_path_buf);
        self.answer.clone()
    }
}

/// Write an executable shell script standing in for the depot downloader
#[cfg(unix)]
pub fn write_fake_downloader(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("DepotDownloadermod");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
