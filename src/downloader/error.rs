// SPDX-License-Identifier: GPL-3.0-only
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum DownloadError {
    #[error("Depot downloader not found at {}. Check the installation.", .0.display())]
    ToolMissing(PathBuf),

    #[error("Failed to start depot downloader: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Process exited with {}", exit_description(.code))]
    ProcessFailure { code: Option<i32> },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}
