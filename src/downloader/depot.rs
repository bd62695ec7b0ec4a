// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::downloader::error::DownloadError;
use crate::downloader::interpreter::OutputInterpreter;
use crate::downloader::models::{DownloadRequest, ProgressEvent};
use crate::downloader::traits::{ItemDownloader, ProgressReporter};
use crate::links::WorkshopId;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x08000000;

/// Downloads workshop items by running the external depot downloader
pub struct DepotRunner {
    executable: PathBuf,
    app_id: u32,
    interpreter: Arc<dyn OutputInterpreter>,
}

impl DepotRunner {
    pub fn new(executable: PathBuf, app_id: u32, interpreter: Arc<dyn OutputInterpreter>) -> Self {
        Self {
            executable,
            app_id,
            interpreter,
        }
    }

    /// Command line handed to the depot downloader
    pub fn build_args(&self, request: &DownloadRequest) -> Vec<String> {
        vec![
            "-app".to_string(),
            self.app_id.to_string(),
            "-pubfile".to_string(),
            request.workshop_id.to_string(),
            "-verify-all".to_string(),
            "-username".to_string(),
            request.account.username.clone(),
            "-password".to_string(),
            request.account.password.clone(),
            "-dir".to_string(),
            request.target_directory.to_string_lossy().into_owned(),
        ]
    }

    /// Feed one output stream through the interpreter until it closes
    async fn pump<R>(
        &self,
        reader: Option<R>,
        stream: &'static str,
        workshop_id: &WorkshopId,
        last_progress: &AtomicU8,
        progress: &dyn ProgressReporter,
    ) where
        R: AsyncRead + Unpin,
    {
        let Some(reader) = reader else {
            return;
        };

        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, stream, %workshop_id, "Failed to read downloader output");
                    break;
                }
            }

            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(['\r', '\n']);
            if line.trim().is_empty() {
                continue;
            }
            debug!(stream, %workshop_id, line, "Downloader output");

            if let Some(update) = self.interpreter.interpret(line) {
                let percent = match update.progress {
                    Some(percent) => {
                        last_progress.store(percent, Ordering::Relaxed);
                        percent
                    }
                    None => last_progress.load(Ordering::Relaxed),
                };
                progress.report(ProgressEvent {
                    workshop_id: workshop_id.clone(),
                    progress: percent,
                    message: update.message,
                });
            }
        }
    }
}

#[async_trait]
impl ItemDownloader for DepotRunner {
    async fn download_item(
        &self,
        request: &DownloadRequest,
        progress: &dyn ProgressReporter,
    ) -> Result<(), DownloadError> {
        let workshop_id = &request.workshop_id;

        if !tokio::fs::try_exists(&self.executable).await.unwrap_or(false) {
            warn!(path = %self.executable.display(), %workshop_id, "Depot downloader executable missing");
            return Err(DownloadError::ToolMissing(self.executable.clone()));
        }

        info!(
            %workshop_id,
            username = %request.account.username,
            dir = %request.target_directory.display(),
            "Starting depot downloader"
        );

        let mut command = Command::new(&self.executable);
        command
            .args(self.build_args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(windows)]
        command.creation_flags(CREATE_NO_WINDOW);

        let mut child = command.spawn().map_err(DownloadError::Spawn)?;

        progress.report(ProgressEvent {
            workshop_id: workshop_id.clone(),
            progress: 0,
            message: "Starting download".to_string(),
        });

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let last_progress = AtomicU8::new(0);

        let (_, _, status) = tokio::join!(
            self.pump(stdout, "stdout", workshop_id, &last_progress, progress),
            self.pump(stderr, "stderr", workshop_id, &last_progress, progress),
            child.wait(),
        );
        let status = status?;

        if status.success() {
            info!(%workshop_id, "Depot downloader finished");
            progress.report(ProgressEvent {
                workshop_id: workshop_id.clone(),
                progress: 100,
                message: "Download complete".to_string(),
            });
            Ok(())
        } else {
            warn!(%workshop_id, code = ?status.code(), "Depot downloader failed");
            Err(DownloadError::ProcessFailure { code: status.code() })
        }
    }
}
