// SPDX-License-Identifier: GPL-3.0-only
pub mod events;
pub mod models;
pub mod service;

pub use events::{BatchState, EventBus, MessageKind, UiEvent};
pub use models::BatchSummary;
pub use service::{BatchError, DownloadOrchestrator};
