// SPDX-License-Identifier: GPL-3.0-only
use regex::Regex;
use std::sync::Arc;
use tracing::warn;

/// What a single console line says about the running download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// New percentage, `None` when the line carries only a status
    pub progress: Option<u8>,
    pub message: String,
}

/// Maps the external tool's console output to progress updates
///
/// The tool's output format is not a contract; each implementation targets
/// one known format so drift stays contained to a single strategy.
pub trait OutputInterpreter: Send + Sync {
    fn name(&self) -> &'static str;

    fn interpret(&self, line: &str) -> Option<ProgressUpdate>;
}

pub const DEFAULT_OUTPUT_FORMAT: &str = DepotDownloaderV2::NAME;

/// Pick an interpreter by its configured name
pub fn interpreter_for(name: &str) -> anyhow::Result<Arc<dyn OutputInterpreter>> {
    let interpreter = DepotDownloaderV2::new()?;
    if name != DEFAULT_OUTPUT_FORMAT {
        warn!(requested = %name, using = DEFAULT_OUTPUT_FORMAT, "Unknown output format, using default");
    }
    Ok(Arc::new(interpreter))
}

/// Console format of DepotDownloader 2.x and its mods
pub struct DepotDownloaderV2 {
    percent: Regex,
    processing: Regex,
    downloading: Regex,
    validating: Regex,
    downloaded: Regex,
    total: Regex,
    auth_failed: Regex,
}

impl DepotDownloaderV2 {
    pub const NAME: &'static str = "depotdownloader-v2";

    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            percent: Regex::new(r"^\s*(\d{1,3}(?:\.\d+)?)%\s*(.*)$")?,
            processing: Regex::new(r"Processing depot (\d+)")?,
            downloading: Regex::new(r"Downloading depot (\d+)")?,
            validating: Regex::new(r"^\s*Validating\s+(.+?)\s*$")?,
            downloaded: Regex::new(r"Downloaded (\d+) bytes")?,
            total: Regex::new(r"Total downloaded: (\d+) bytes")?,
            auth_failed: Regex::new(r"(?i)authentication failed")?,
        })
    }

    fn status(message: String) -> Option<ProgressUpdate> {
        Some(ProgressUpdate { progress: None, message })
    }
}

impl OutputInterpreter for DepotDownloaderV2 {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn interpret(&self, line: &str) -> Option<ProgressUpdate> {
        if self.auth_failed.is_match(line) {
            return Self::status("Authentication failed".to_string());
        }

        if let Some(caps) = self.total.captures(line).or_else(|| self.downloaded.captures(line)) {
            return Some(ProgressUpdate {
                progress: Some(100),
                message: format!("Downloaded {} bytes", &caps[1]),
            });
        }

        if let Some(caps) = self.percent.captures(line) {
            let percent = caps[1].parse::<f64>().ok()?.clamp(0.0, 100.0);
            let file = caps[2].trim();
            let message = if file.is_empty() {
                "Downloading".to_string()
            } else {
                format!("Downloading {}", file)
            };
            return Some(ProgressUpdate {
                progress: Some(percent.floor() as u8),
                message,
            });
        }

        if let Some(caps) = self.processing.captures(line) {
            return Self::status(format!("Processing depot {}", &caps[1]));
        }

        if let Some(caps) = self.downloading.captures(line) {
            return Self::status(format!("Downloading depot {}", &caps[1]));
        }

        if let Some(caps) = self.validating.captures(line) {
            return Self::status(format!("Validating {}", &caps[1]));
        }

        None
    }
}
