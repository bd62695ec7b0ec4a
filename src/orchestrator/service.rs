// SPDX-License-Identifier: GPL-3.0-only
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::accounts::Account;
use crate::downloader::{DownloadRequest, ItemDownloader};
use crate::links::LinkExtractor;
use crate::orchestrator::events::{BatchState, EventBus, MessageKind, UiEvent};
use crate::orchestrator::models::{BatchSummary, ItemOutcome, ItemStatus};
use crate::settings::SettingsStore;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("A download is already running")]
    AlreadyRunning,

    #[error("Please select a save directory before downloading")]
    NoSaveLocation,

    #[error("Please enter at least one workshop link")]
    NoLinks,
}

/// Runs download batches one item at a time
pub struct DownloadOrchestrator {
    downloader: Arc<dyn ItemDownloader>,
    settings: Arc<dyn SettingsStore>,
    extractor: LinkExtractor,
    events: EventBus,
    running: tokio::sync::Mutex<()>,
    state: Mutex<BatchState>,
}

impl DownloadOrchestrator {
    pub fn new(
        downloader: Arc<dyn ItemDownloader>,
        settings: Arc<dyn SettingsStore>,
        events: EventBus,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            downloader,
            settings,
            extractor: LinkExtractor::new()?,
            events,
            running: tokio::sync::Mutex::new(()),
            state: Mutex::new(BatchState::Idle),
        })
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn state(&self) -> BatchState {
        self.state
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or(BatchState::Idle)
    }

    pub fn is_running(&self) -> bool {
        self.running.try_lock().is_err()
    }

    fn set_state(&self, state: BatchState) {
        if let Ok(mut guard) = self.state.lock() {
            *guard = state.clone();
        }
        self.events.emit(UiEvent::State(state));
    }

    fn refuse(&self, error: BatchError) -> Result<BatchSummary, BatchError> {
        self.events.message(error.to_string(), MessageKind::Error);
        Err(error)
    }

    /// Download every workshop link in `links` with `account`
    ///
    /// Items go to `<save_path>/<id>`; without an explicit `save_path` the
    /// last saved location is used. Per-item failures are reported and
    /// counted, never abort the batch.
    pub async fn run_batch(
        &self,
        links: &str,
        account: &Account,
        save_path: Option<PathBuf>,
    ) -> Result<BatchSummary, BatchError> {
        let Ok(_running) = self.running.try_lock() else {
            return self.refuse(BatchError::AlreadyRunning);
        };

        let save_path = match save_path {
            Some(path) => Some(path),
            None => self.settings.load().await.last_save_location,
        };
        let Some(save_path) = save_path else {
            return self.refuse(BatchError::NoSaveLocation);
        };

        if links.trim().is_empty() {
            return self.refuse(BatchError::NoLinks);
        }

        let batch_id = Uuid::new_v4();
        self.set_state(BatchState::Preparing);

        let lines = self.extractor.extract_all(links);
        let total = lines.len();
        info!(%batch_id, total, dir = %save_path.display(), account = %account.label(), "Starting download batch");

        let mut outcomes = Vec::with_capacity(total);
        for (index, line) in lines.into_iter().enumerate() {
            let Some(workshop_id) = line.id else {
                warn!(%batch_id, line = line.line, input = %line.input, "Skipping invalid link");
                self.events.message(format!("Invalid link: {}", line.input), MessageKind::Error);
                outcomes.push(ItemOutcome {
                    line: line.line,
                    input: line.input,
                    workshop_id: None,
                    status: ItemStatus::Invalid,
                    started_at: None,
                    finished_at: None,
                });
                continue;
            };

            self.set_state(BatchState::Downloading {
                index: index + 1,
                total,
                workshop_id: workshop_id.clone(),
            });

            let request = DownloadRequest::new(workshop_id.clone(), account.clone(), &save_path);
            let started_at = Utc::now();
            let result = self.downloader.download_item(&request, &self.events).await;
            let finished_at = Utc::now();

            let status = match result {
                Ok(()) => {
                    info!(%batch_id, %workshop_id, "Item downloaded");
                    ItemStatus::Succeeded
                }
                Err(e) => {
                    warn!(%batch_id, %workshop_id, error = %e, "Item failed");
                    self.events.message(
                        format!("Error downloading {}: {}", workshop_id, e),
                        MessageKind::Error,
                    );
                    ItemStatus::Failed { reason: e.to_string() }
                }
            };

            outcomes.push(ItemOutcome {
                line: line.line,
                input: line.input,
                workshop_id: Some(workshop_id),
                status,
                started_at: Some(started_at),
                finished_at: Some(finished_at),
            });
        }

        let summary = BatchSummary::new(batch_id, outcomes);
        self.set_state(BatchState::Idle);

        let kind = if summary.all_succeeded() {
            MessageKind::Success
        } else {
            MessageKind::Info
        };
        self.events.message(summary.describe(), kind);
        info!(
            %batch_id,
            succeeded = summary.succeeded,
            failed = summary.failed,
            invalid = summary.invalid,
            "Download batch finished"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::test_helpers::{FakeDownloader, MemorySettingsStore};
    use std::time::Duration;
    use tokio::sync::broadcast::Receiver;

    fn orchestrator(downloader: Arc<FakeDownloader>, settings: Settings) -> DownloadOrchestrator {
        DownloadOrchestrator::new(
            downloader,
            Arc::new(MemorySettingsStore::new(settings)),
            EventBus::default(),
        )
        .unwrap()
    }

    fn account() -> Account {
        Account::new("steamuser", "s3cret")
    }

    fn drain(rx: &mut Receiver<UiEvent>) -> Vec<UiEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn messages(events: &[UiEvent]) -> Vec<(String, MessageKind)> {
        events
            .iter()
            .filter_map(|e| match e {
                UiEvent::Message { text, kind } => Some((text.clone(), *kind)),
                _ => None,
            })
            .collect()
    }

    const THREE_LINKS: &str = "https://steamcommunity.com/sharedfiles/filedetails/?id=11111111\n\
        https://steamcommunity.com/sharedfiles/filedetails/?id=22222222\n\
        33333333\n";

    #[tokio::test]
    async fn test_failure_in_middle_does_not_abort_batch() {
        let downloader = Arc::new(FakeDownloader::failing(&["22222222"]));
        let orch = orchestrator(downloader.clone(), Settings::default());

        let summary = orch
            .run_batch(THREE_LINKS, &account(), Some(PathBuf::from("/saves")))
            .await
            .unwrap();

        assert_eq!(downloader.calls(), vec!["11111111", "22222222", "33333333"]);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.invalid, 0);
        assert!(matches!(summary.outcomes[1].status, ItemStatus::Failed { .. }));
        assert_eq!(orch.state(), BatchState::Idle);
    }

    #[tokio::test]
    async fn test_items_never_overlap() {
        let downloader = Arc::new(FakeDownloader::with_delay(Duration::from_millis(20)));
        let orch = orchestrator(downloader.clone(), Settings::default());

        let summary = orch
            .run_batch(THREE_LINKS, &account(), Some(PathBuf::from("/saves")))
            .await
            .unwrap();

        assert_eq!(downloader.max_active(), 1);
        for pair in summary.outcomes.windows(2) {
            assert!(pair[0].finished_at.unwrap() <= pair[1].started_at.unwrap());
        }
    }

    #[tokio::test]
    async fn test_invalid_lines_reported_and_skipped() {
        let downloader = Arc::new(FakeDownloader::default());
        let orch = orchestrator(downloader.clone(), Settings::default());
        let mut rx = orch.events().subscribe();

        let summary = orch
            .run_batch("not a link\n12345678\n", &account(), Some(PathBuf::from("/saves")))
            .await
            .unwrap();

        assert_eq!(downloader.calls(), vec!["12345678"]);
        assert_eq!(summary.invalid, 1);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.outcomes[0].status, ItemStatus::Invalid);
        assert_eq!(summary.outcomes[0].line, 1);

        let messages = messages(&drain(&mut rx));
        assert!(messages.contains(&("Invalid link: not a link".to_string(), MessageKind::Error)));
        assert_eq!(
            messages.last(),
            Some(&("Download completed: 1 succeeded, 0 failed, 1 invalid".to_string(), MessageKind::Info))
        );
    }

    #[tokio::test]
    async fn test_state_transitions() {
        let downloader = Arc::new(FakeDownloader::default());
        let orch = orchestrator(downloader, Settings::default());
        let mut rx = orch.events().subscribe();

        orch.run_batch("12345678\n87654321", &account(), Some(PathBuf::from("/saves")))
            .await
            .unwrap();

        let states: Vec<BatchState> = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::State(state) => Some(state),
                _ => None,
            })
            .collect();

        assert_eq!(states.len(), 4);
        assert_eq!(states[0], BatchState::Preparing);
        assert!(matches!(states[1], BatchState::Downloading { index: 1, total: 2, .. }));
        assert!(matches!(states[2], BatchState::Downloading { index: 2, total: 2, .. }));
        assert_eq!(states[3], BatchState::Idle);
    }

    #[tokio::test]
    async fn test_progress_is_forwarded() {
        let downloader = Arc::new(FakeDownloader::default());
        let orch = orchestrator(downloader, Settings::default());
        let mut rx = orch.events().subscribe();

        orch.run_batch("12345678", &account(), Some(PathBuf::from("/saves")))
            .await
            .unwrap();

        let progress: Vec<u8> = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Progress(p) => Some(p.progress),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![50, 100]);
    }

    #[tokio::test]
    async fn test_target_directory_per_item() {
        let downloader = Arc::new(FakeDownloader::default());
        let orch = orchestrator(downloader.clone(), Settings::default());

        orch.run_batch("12345678", &account(), Some(PathBuf::from("/saves")))
            .await
            .unwrap();

        assert_eq!(downloader.target_dirs(), vec![PathBuf::from("/saves/12345678")]);
    }

    #[tokio::test]
    async fn test_uses_saved_location_when_none_given() {
        let downloader = Arc::new(FakeDownloader::default());
        let orch = orchestrator(downloader.clone(), Settings::with_save_location("/remembered"));

        orch.run_batch("12345678", &account(), None).await.unwrap();

        assert_eq!(downloader.target_dirs(), vec![PathBuf::from("/remembered/12345678")]);
    }

    #[tokio::test]
    async fn test_refuses_without_save_location() {
        let downloader = Arc::new(FakeDownloader::default());
        let orch = orchestrator(downloader.clone(), Settings::default());
        let mut rx = orch.events().subscribe();

        let result = orch.run_batch("12345678", &account(), None).await;

        assert_eq!(result.unwrap_err(), BatchError::NoSaveLocation);
        assert!(downloader.calls().is_empty());
        let messages = messages(&drain(&mut rx));
        assert_eq!(messages[0].1, MessageKind::Error);
    }

    #[tokio::test]
    async fn test_refuses_blank_input() {
        let downloader = Arc::new(FakeDownloader::default());
        let orch = orchestrator(downloader.clone(), Settings::default());

        let result = orch.run_batch("  \n\n", &account(), Some(PathBuf::from("/saves"))).await;

        assert_eq!(result.unwrap_err(), BatchError::NoLinks);
        assert_eq!(orch.state(), BatchState::Idle);
    }

    #[tokio::test]
    async fn test_second_batch_refused_while_running() {
        let downloader = Arc::new(FakeDownloader::with_delay(Duration::from_millis(100)));
        let orch = orchestrator(downloader.clone(), Settings::default());
        let account = account();

        let (first, second) = tokio::join!(
            orch.run_batch("12345678", &account, Some(PathBuf::from("/saves"))),
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                assert!(orch.is_running());
                orch.run_batch("87654321", &account, Some(PathBuf::from("/saves"))).await
            }
        );

        assert_eq!(first.unwrap().succeeded, 1);
        assert_eq!(second.unwrap_err(), BatchError::AlreadyRunning);
        assert_eq!(downloader.calls(), vec!["12345678"]);
        assert!(!orch.is_running());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dropped_batch_stops_its_process() {
        use crate::downloader::interpreter::DepotDownloaderV2;
        use crate::downloader::DepotRunner;
        use crate::test_helpers::write_fake_downloader;
        use tempfile::TempDir;

        let temp_dir = TempDir::new().unwrap();
        let log = temp_dir.path().join("runs.log");
        let script = write_fake_downloader(
            temp_dir.path(),
            &format!(
                "echo \"start $4\" >> '{log}'\nsleep 1\necho \"end $4\" >> '{log}'",
                log = log.display()
            ),
        );
        let runner = DepotRunner::new(script, 431960, Arc::new(DepotDownloaderV2::new().unwrap()));
        let orch = DownloadOrchestrator::new(
            Arc::new(runner),
            Arc::new(MemorySettingsStore::default()),
            EventBus::default(),
        )
        .unwrap();
        let account = account();
        let save = Some(temp_dir.path().to_path_buf());

        let first = tokio::time::timeout(
            Duration::from_millis(300),
            orch.run_batch("11111111", &account, save.clone()),
        )
        .await;
        assert!(first.is_err());
        assert!(!orch.is_running());

        let second = orch.run_batch("22222222", &account, save).await.unwrap();
        assert_eq!(second.succeeded, 1);

        let runs = std::fs::read_to_string(&log).unwrap();
        assert!(!runs.contains("end 11111111"), "dropped item kept running: {runs}");
        assert_eq!(runs.lines().last(), Some("end 22222222"));
    }
}
