// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use crate::settings::models::Settings;

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read persisted settings; missing or unreadable data yields defaults
    async fn load(&self) -> Settings;

    /// Persist settings, replacing whatever was stored before
    async fn save(&self, settings: &Settings) -> anyhow::Result<()>;
}
