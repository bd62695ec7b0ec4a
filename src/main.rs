// SPDX-License-Identifier: GPL-3.0-only
mod accounts;
mod api;
mod cli;
mod config;
mod downloader;
mod links;
mod logging;
mod orchestrator;
mod picker;
mod preview;
mod settings;

#[cfg(test)]
mod test_helpers;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use anyhow::Context;
use tokio::io::AsyncReadExt;
use tokio::signal;
use tracing::{error, info, warn};

use accounts::AccountBook;
use api::{ApiHandlers, HttpServer};
use cli::{Command, DownloadArgs, LinkSource};
use config::Config;
use downloader::{interpreter_for, kill_by_name, DepotRunner};
use links::WorkshopId;
use logging::setup_logging;
use orchestrator::{DownloadOrchestrator, EventBus};
use picker::{choose_directory, DirectoryPicker, NativeDirectoryPicker};
use preview::PreviewClient;
use settings::{JsonSettingsStore, SettingsStore};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let command = cli::parse_args(std::env::args().skip(1))?;
    if command == Command::Help {
        println!("{}", cli::USAGE);
        return Ok(ExitCode::SUCCESS);
    }

    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    setup_logging(&config.log_level)?;

    info!("Starting WorkshopDownloader v{}", env!("CARGO_PKG_VERSION"));

    let settings: Arc<dyn SettingsStore> = Arc::new(JsonSettingsStore::new(config.settings_file()));

    match command {
        Command::Help => Ok(ExitCode::SUCCESS),
        Command::Accounts => list_accounts(&config),
        Command::PickDir => pick_dir(settings.as_ref()).await,
        Command::Preview(ids) => preview(&config, ids).await,
        Command::Download(args) => download(&config, settings, args).await,
        Command::Serve => serve(&config, settings).await,
    }
}

fn build_orchestrator(
    config: &Config,
    settings: Arc<dyn SettingsStore>,
    events: EventBus,
) -> anyhow::Result<DownloadOrchestrator> {
    let executable = config.downloader_executable();
    let interpreter = interpreter_for(&config.output_format)?;
    info!(
        path = %executable.display(),
        app_id = config.app_id,
        output_format = interpreter.name(),
        "Using depot downloader"
    );

    let runner = DepotRunner::new(executable, config.app_id, interpreter);
    DownloadOrchestrator::new(Arc::new(runner), settings, events)
}

fn list_accounts(config: &Config) -> anyhow::Result<ExitCode> {
    let book = AccountBook::load(&config.accounts_file)?;
    if book.is_empty() {
        println!("No accounts configured in {}", config.accounts_file.display());
        return Ok(ExitCode::FAILURE);
    }

    for summary in book.summaries() {
        if summary.label == summary.username {
            println!("{}", summary.label);
        } else {
            println!("{} ({})", summary.label, summary.username);
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn pick_dir(settings: &dyn SettingsStore) -> anyhow::Result<ExitCode> {
    let picker = NativeDirectoryPicker::default();
    match choose_directory(&picker, settings).await? {
        Some(path) => {
            println!("Save directory set to {}", path.display());
            Ok(ExitCode::SUCCESS)
        }
        None => {
            println!("Error selecting directory");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn preview(config: &Config, ids: Vec<String>) -> anyhow::Result<ExitCode> {
    let client = PreviewClient::new(config.steam_api_url.clone())?;
    let mut exit = ExitCode::SUCCESS;

    for raw in ids {
        let Some(workshop_id) = WorkshopId::parse(&raw) else {
            println!("{}: not a workshop ID", raw);
            exit = ExitCode::FAILURE;
            continue;
        };

        match client.fetch(&workshop_id).await {
            Ok(preview) => {
                println!("{}: {}", preview.workshop_id, preview.title);
                if let Some(url) = preview.preview_url {
                    println!("  preview: {}", url);
                }
                if let Some(size) = preview.file_size {
                    println!("  size: {} bytes", size);
                }
            }
            Err(e) => {
                println!("{}: {}", workshop_id, e);
                exit = ExitCode::FAILURE;
            }
        }
    }
    Ok(exit)
}

async fn read_links(source: &LinkSource) -> anyhow::Result<String> {
    match source {
        LinkSource::File(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read links file: {}", path.display())),
        LinkSource::Stdin => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read links from stdin")?;
            Ok(text)
        }
    }
}

async fn download(
    config: &Config,
    settings: Arc<dyn SettingsStore>,
    args: DownloadArgs,
) -> anyhow::Result<ExitCode> {
    let book = AccountBook::load(&config.accounts_file)?;
    let account = match args.account.as_deref() {
        Some(name) => book
            .find(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown account '{}'", name))?,
        None => book.default_account().ok_or_else(|| {
            anyhow::anyhow!("No accounts configured in {}", config.accounts_file.display())
        })?,
    };

    let save_path: Option<PathBuf> = if args.pick_dir {
        let picker = NativeDirectoryPicker::default();
        match choose_directory(&picker, settings.as_ref()).await? {
            Some(path) => Some(path),
            None => {
                println!("Error selecting directory");
                return Ok(ExitCode::FAILURE);
            }
        }
    } else if let Some(dir) = args.dir {
        // An explicit directory counts as a pick and is remembered
        let mut current = settings.load().await;
        current.last_save_location = Some(dir.clone());
        settings.save(&current).await?;
        Some(dir)
    } else {
        None
    };

    let links = read_links(&args.source).await?;

    let events = EventBus::default();
    let console = cli::spawn_console(events.subscribe());
    let orchestrator = build_orchestrator(config, settings, events)?;

    let result = tokio::select! {
        result = orchestrator.run_batch(&links, account, save_path) => Some(result),
        _ = signal::ctrl_c() => None,
    };

    // Closing the bus lets the console drain and exit
    drop(orchestrator);
    if let Err(e) = console.await {
        warn!(error = %e, "Console task failed");
    }

    match result {
        Some(Ok(summary)) => Ok(ExitCode::from(cli::exit_status(&summary))),
        Some(Err(_)) => Ok(ExitCode::FAILURE),
        None => {
            warn!("Interrupted, stopping downloader");
            if config.kill_on_exit {
                kill_by_name(&config.downloader_process_name()).await;
            }
            Ok(ExitCode::from(130))
        }
    }
}

async fn serve(config: &Config, settings: Arc<dyn SettingsStore>) -> anyhow::Result<ExitCode> {
    let accounts = Arc::new(AccountBook::load(&config.accounts_file)?);
    let orchestrator = Arc::new(build_orchestrator(config, settings.clone(), EventBus::default())?);
    let picker: Arc<dyn DirectoryPicker> = Arc::new(NativeDirectoryPicker::default());
    let preview = Arc::new(PreviewClient::new(config.steam_api_url.clone())?);

    let handlers = Arc::new(ApiHandlers::new(orchestrator, accounts, settings, picker, preview));
    let server = HttpServer::new(handlers, config.api_bind);

    let server_task = tokio::spawn(async move {
        if let Err(e) = server.serve().await {
            error!(error = %e, "HTTP server error");
        }
    });

    info!("All services started. Waiting for shutdown signal...");

    // Wait for shutdown signal
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal (Ctrl+C)");
        }
        Err(err) => {
            error!(error = %err, "Unable to listen for shutdown signal");
        }
    }

    // A running batch is dropped with the server; its subprocess is not
    // tracked, so it is reaped by name
    info!("Initiating shutdown...");
    server_task.abort();
    if config.kill_on_exit {
        kill_by_name(&config.downloader_process_name()).await;
    }

    info!("Shutdown complete");
    Ok(ExitCode::SUCCESS)
}
