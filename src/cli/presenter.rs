// SPDX-License-Identifier: GPL-3.0-only
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::orchestrator::{BatchState, BatchSummary, MessageKind, UiEvent};

/// Render one UI event as a terminal line; `None` for silent events
pub fn render(event: &UiEvent) -> Option<String> {
    match event {
        UiEvent::Progress(p) => Some(format!("  [{}] {:>3}% {}", p.workshop_id, p.progress, p.message)),
        UiEvent::Message { text, kind } => {
            let prefix = match kind {
                MessageKind::Info => "info",
                MessageKind::Success => "done",
                MessageKind::Error => "error",
            };
            Some(format!("{}: {}", prefix, text))
        }
        UiEvent::State(BatchState::Downloading { index, total, workshop_id }) => {
            Some(format!("Downloading item {}/{}: {}", index, total, workshop_id))
        }
        UiEvent::State(BatchState::Preparing | BatchState::Idle) => None,
    }
}

/// Print events to stdout until the bus closes
pub fn spawn_console(mut events: broadcast::Receiver<UiEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(line) = render(&event) {
                        println!("{}", line);
                    }
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    })
}

/// Process exit status for a finished batch: any failed or invalid line fails it
pub fn exit_status(summary: &BatchSummary) -> u8 {
    if summary.all_succeeded() { 0 } else { 1 }
}
