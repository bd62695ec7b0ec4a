// SPDX-License-Identifier: GPL-3.0-only
use std::process::Stdio;
use tokio::process::Command;
use tracing::{info, warn};

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x08000000;

/// Longest process name the kernel keeps (`comm` is 16 bytes with the NUL)
#[cfg(not(windows))]
const COMM_MAX_LEN: usize = 15;

/// Name as `pkill -x` sees it: truncated to the kernel's `comm` length
#[cfg(not(windows))]
fn process_name(exe_name: &str) -> &str {
    if exe_name.len() <= COMM_MAX_LEN {
        return exe_name;
    }
    let mut end = COMM_MAX_LEN;
    while !exe_name.is_char_boundary(end) {
        end -= 1;
    }
    &exe_name[..end]
}

/// Build the platform kill-by-name command
pub fn kill_command(exe_name: &str) -> Command {
    #[cfg(windows)]
    {
        let mut command = Command::new("taskkill");
        command.args(["/f", "/im", exe_name]);
        command.creation_flags(CREATE_NO_WINDOW);
        command
    }

    #[cfg(not(windows))]
    {
        let mut command = Command::new("pkill");
        command.args(["-x", process_name(exe_name)]);
        command
    }
}

/// Best-effort kill of every process with the given executable name
///
/// Matches the exact process name only, so an unrelated process with the
/// same name is killed too. Failures are logged and otherwise ignored.
pub async fn kill_by_name(exe_name: &str) {
    let mut command = kill_command(exe_name);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    match command.status().await {
        Ok(status) if status.success() => {
            info!(exe_name, "Killed leftover downloader processes");
        }
        Ok(status) => {
            info!(exe_name, code = ?status.code(), "No leftover downloader processes");
        }
        Err(e) => {
            warn!(error = %e, exe_name, "Failed to run process kill command");
        }
    }
}
