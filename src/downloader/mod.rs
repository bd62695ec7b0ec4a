// SPDX-License-Identifier: GPL-3.0-only
pub mod depot;
pub mod error;
pub mod interpreter;
pub mod models;
pub mod reaper;
pub mod traits;

pub use depot::DepotRunner;
pub use error::DownloadError;
pub use interpreter::{interpreter_for, OutputInterpreter};
pub use models::{DownloadRequest, ProgressEvent};
pub use reaper::kill_by_name;
pub use traits::{ItemDownloader, ProgressReporter};
