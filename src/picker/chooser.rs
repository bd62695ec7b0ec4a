// SPDX-License-Identifier: GPL-3.0-only
use std::path::PathBuf;

use crate::picker::traits::DirectoryPicker;
use crate::settings::SettingsStore;

/// Run the picker and remember the chosen directory right away
///
/// Cancelling leaves the stored settings untouched.
pub async fn choose_directory(
    picker: &dyn DirectoryPicker,
    store: &dyn SettingsStore,
) -> anyhow::Result<Option<PathBuf>> {
    let mut settings = store.load().await;

    let Some(path) = picker.pick(settings.last_save_location.as_deref()).await else {
        return Ok(None);
    };

    settings.last_save_location = Some(path.clone());
    store.save(&settings).await?;
    Ok(Some(path))
}
