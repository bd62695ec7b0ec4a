// SPDX-License-Identifier: GPL-3.0-only
use anyhow::Context;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::settings::{models::Settings, traits::SettingsStore};

/// Settings kept as a flat JSON object in the per-user config directory
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SettingsStore for JsonSettingsStore {
    async fn load(&self) -> Settings {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No settings file yet");
                return Settings::default();
            }
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "Failed to read settings, using defaults");
                return Settings::default();
            }
        };

        match serde_json::from_str::<Settings>(&contents) {
            Ok(mut settings) => {
                if settings.last_save_location.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
                    settings.last_save_location = None;
                }
                settings
            }
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "Settings file is malformed, ignoring it");
                Settings::default()
            }
        }
    }

    async fn save(&self, settings: &Settings) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await
                .with_context(|| format!("Failed to create settings directory: {}", parent.display()))?;
        }

        let contents = serde_json::to_string_pretty(settings)?;
        let temp_path = self.temp_path();

        tokio::fs::write(&temp_path, contents).await
            .with_context(|| format!("Failed to write settings: {}", temp_path.display()))?;
        tokio::fs::rename(&temp_path, &self.path).await
            .with_context(|| format!("Failed to replace settings: {}", self.path.display()))?;

        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}
