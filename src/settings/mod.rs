// SPDX-License-Identifier: GPL-3.0-only
pub mod json;
pub mod models;
pub mod traits;

pub use json::JsonSettingsStore;
pub use models::Settings;
pub use traits::SettingsStore;
