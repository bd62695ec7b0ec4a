// SPDX-License-Identifier: GPL-3.0-only
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Wallpaper Engine, the app every workshop item is resolved against by default.
pub const DEFAULT_APP_ID: u32 = 431960;

/// Directory shipped next to the binary that holds the external downloader.
pub const DOWNLOADER_DIR_NAME: &str = "DepotDownloaderMod";

#[cfg(windows)]
pub const DOWNLOADER_EXE_NAME: &str = "DepotDownloadermod.exe";
#[cfg(not(windows))]
pub const DOWNLOADER_EXE_NAME: &str = "DepotDownloadermod";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Explicit path to the depot downloader executable; resolved next to
    /// the binary when unset
    pub downloader_path: Option<PathBuf>,

    /// Steam app the workshop items belong to
    pub app_id: u32,

    /// TOML file holding the selectable accounts
    pub accounts_file: PathBuf,

    /// Override for the settings JSON location
    pub settings_path: Option<PathBuf>,

    /// Name of the console output interpreter to use
    pub output_format: String,

    /// Local API bind address (e.g., "127.0.0.1:8787")
    pub api_bind: SocketAddr,

    /// Base URL of the Steam Web API used for previews
    pub steam_api_url: String,

    /// Kill leftover downloader processes by name on shutdown
    pub kill_on_exit: bool,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from TOML file with environment variable overrides
    pub fn load() -> anyhow::Result<Self> {
        let config_path = std::env::var("WSDL_CONFIG")
            .unwrap_or_else(|_| "config.toml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            Self::from_file(Path::new(&config_path))?
        } else {
            Config::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Apply `WSDL_*` overrides using the given variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("WSDL_DOWNLOADER_PATH") {
            self.downloader_path = Some(PathBuf::from(val));
        }
        if let Some(val) = lookup("WSDL_APP_ID") {
            self.app_id = val.parse().context("WSDL_APP_ID must be a number")?;
        }
        if let Some(val) = lookup("WSDL_ACCOUNTS_FILE") {
            self.accounts_file = PathBuf::from(val);
        }
        if let Some(val) = lookup("WSDL_SETTINGS_PATH") {
            self.settings_path = Some(PathBuf::from(val));
        }
        if let Some(val) = lookup("WSDL_OUTPUT_FORMAT") {
            self.output_format = val;
        }
        if let Some(val) = lookup("WSDL_API_BIND") {
            self.api_bind = SocketAddr::from_str(&val)?;
        }
        if let Some(val) = lookup("WSDL_STEAM_API_URL") {
            self.steam_api_url = val;
        }
        if let Some(val) = lookup("WSDL_KILL_ON_EXIT") {
            self.kill_on_exit = val.parse().context("WSDL_KILL_ON_EXIT must be true or false")?;
        }
        if let Some(val) = lookup("WSDL_LOG_LEVEL") {
            self.log_level = val;
        }

        Ok(())
    }

    /// Path of the depot downloader executable
    pub fn downloader_executable(&self) -> PathBuf {
        if let Some(ref path) = self.downloader_path {
            return path.clone();
        }

        let base = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join(DOWNLOADER_DIR_NAME).join(DOWNLOADER_EXE_NAME)
    }

    /// Process name of the configured downloader, used to reap it on exit
    pub fn downloader_process_name(&self) -> String {
        self.downloader_executable()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| DOWNLOADER_EXE_NAME.to_string())
    }

    /// Path of the persisted settings file
    pub fn settings_file(&self) -> PathBuf {
        if let Some(ref path) = self.settings_path {
            return path.clone();
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("workshop-downloader")
            .join("settings.json")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            downloader_path: None,
            app_id: DEFAULT_APP_ID,
            accounts_file: PathBuf::from("accounts.toml"),
            settings_path: None,
            output_format: String::from("depotdownloader-v2"),
            api_bind: SocketAddr::from(([127, 0, 0, 1], 8787)),
            steam_api_url: String::from("https://api.steampowered.com"),
            kill_on_exit: true,
            log_level: String::from("info"),
        }
    }
}
