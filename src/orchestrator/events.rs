// SPDX-License-Identifier: GPL-3.0-only
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::downloader::{ProgressEvent, ProgressReporter};
use crate::links::WorkshopId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Info,
    Success,
    Error,
}

/// Where the download flow currently is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BatchState {
    Idle,
    Preparing,
    Downloading {
        /// 1-based position among the batch's lines
        index: usize,
        total: usize,
        workshop_id: WorkshopId,
    },
}

/// Everything the presentation layer is told about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum UiEvent {
    Progress(ProgressEvent),
    Message { text: String, kind: MessageKind },
    State(BatchState),
}

/// Fan-out of UI events to any number of front ends
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<UiEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: UiEvent) {
        // No subscribers is fine; events are fire-and-forget
        let _ = self.tx.send(event);
    }

    pub fn message(&self, text: impl Into<String>, kind: MessageKind) {
        self.emit(UiEvent::Message {
            text: text.into(),
            kind,
        });
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl ProgressReporter for EventBus {
    fn report(&self, event: ProgressEvent) {
        self.emit(UiEvent::Progress(event));
    }
}
