// SPDX-License-Identifier: GPL-3.0-only
pub mod args;
pub mod presenter;

pub use args::{parse_args, Command, DownloadArgs, LinkSource, USAGE};
pub use presenter::{exit_status, spawn_console};
