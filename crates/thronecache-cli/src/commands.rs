use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use futures::StreamExt;
use thronecache_core::export;
use thronecache_core::{LoadOutcome, PageNumber, SyncError, SyncRequest};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::app::App;
use crate::output;
use crate::Command;

/// Buffer size for request results coming back from spawned tasks.
const CHANNEL_BUFFER_SIZE: usize = 32;

pub async fn run(app: &App, command: Command) -> Result<()> {
    match command {
        Command::Page { page } => {
            let outcome = app.sync.request_page(page).await?;
            output::print_outcome(&outcome);
            output::print_characters(&app.sync.snapshot()?);
        }
        Command::Refresh { page } => {
            let page = page.unwrap_or_else(|| app.config.default_refresh_page());
            let outcome = app.sync.request_refresh(page).await?;
            output::print_outcome(&outcome);
            output::print_characters(&app.sync.snapshot()?);
        }
        Command::List => output::print_characters(&app.sync.snapshot()?),
        Command::Status => output::print_status(app)?,
        Command::Clear => {
            app.sync.clear().await?;
            println!("Cache cleared.");
        }
        Command::Export { file, backup } => export_cache(app, &file, backup)?,
        Command::Delete { file, backup } => {
            let backup = backup.unwrap_or_else(|| backup_path(&file));
            if export::delete_with_backup(&file, &backup)? {
                println!("Deleted {} (backup at {})", file.display(), backup.display());
            } else {
                println!("Nothing to delete at {}", file.display());
            }
        }
        Command::Restore { file, backup } => {
            let backup = backup.unwrap_or_else(|| backup_path(&file));
            export::restore_file(&backup, &file)?;
            println!("Restored {} from {}", file.display(), backup.display());
        }
        Command::Watch => watch(app).await?,
    }
    Ok(())
}

fn backup_path(file: &Path) -> PathBuf {
    let mut name = file.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

fn export_cache(app: &App, file: &Path, backup: bool) -> Result<()> {
    if backup {
        let backup_file = backup_path(file);
        if export::backup_file(file, &backup_file)? {
            println!("Backed up {} to {}", file.display(), backup_file.display());
        }
    }
    let snapshot = app.sync.snapshot()?;
    let count = export::export_characters(file, &snapshot)?;
    println!("Exported {} characters to {}", count, file.display());
    Ok(())
}

/// A line typed into `watch`.
#[derive(Debug, PartialEq, Eq)]
enum WatchCommand {
    Request(SyncRequest),
    List,
    Help,
    Quit,
}

fn parse_watch_command(line: &str, default_refresh: PageNumber) -> Result<WatchCommand, String> {
    let mut parts = line.split_whitespace();
    let verb = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts.next();
    if parts.next().is_some() {
        return Err(format!("Too many arguments: '{}'", line.trim()));
    }

    let parse_page = |arg: &str| arg.parse::<PageNumber>().map_err(|e| e.to_string());

    match (verb.as_str(), arg) {
        ("page" | "p", Some(arg)) => Ok(WatchCommand::Request(SyncRequest::Page(parse_page(arg)?))),
        ("page" | "p", None) => Err("Usage: page <N>".to_string()),
        ("refresh" | "r", Some(arg)) => {
            Ok(WatchCommand::Request(SyncRequest::Refresh(parse_page(arg)?)))
        }
        ("refresh" | "r", None) => Ok(WatchCommand::Request(SyncRequest::Refresh(default_refresh))),
        ("list" | "ls", None) => Ok(WatchCommand::List),
        ("help" | "?", None) => Ok(WatchCommand::Help),
        ("quit" | "exit" | "q", None) => Ok(WatchCommand::Quit),
        ("", None) => Err(String::new()),
        _ => Err(format!("Unknown command: '{}'", line.trim())),
    }
}

struct RequestResult {
    request: SyncRequest,
    result: Result<LoadOutcome, SyncError>,
}

/// Print every feed emission while accepting requests from stdin.
/// Requests run in the background; failures are reported, not fatal.
async fn watch(app: &App) -> Result<()> {
    let mut feed = app.sync.subscribe().context("Failed to subscribe to cache")?;
    let (tx, mut rx) = mpsc::channel::<RequestResult>(CHANNEL_BUFFER_SIZE);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let default_refresh = app.config.default_refresh_page();

    output::print_watch_help();

    loop {
        tokio::select! {
            snapshot = feed.next() => {
                match snapshot {
                    Some(snapshot) => output::print_snapshot(&snapshot),
                    None => break,
                }
            }
            Some(done) = rx.recv() => {
                match done.result {
                    Ok(outcome) => output::print_outcome(&outcome),
                    Err(e) => output::print_failure(&done.request, &e),
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                match parse_watch_command(&line, default_refresh) {
                    Ok(WatchCommand::Request(request)) => {
                        debug!(%request, "Spawning request");
                        let handle = app.sync.spawn(request);
                        let tx = tx.clone();
                        tokio::spawn(async move {
                            let result = match handle.await {
                                Ok(result) => result,
                                Err(e) => {
                                    error!(error = %e, "Request task did not complete");
                                    return;
                                }
                            };
                            if tx.send(RequestResult { request, result }).await.is_err() {
                                debug!("Watch loop gone before request finished");
                            }
                        });
                    }
                    Ok(WatchCommand::List) => output::print_characters(&app.sync.snapshot()?),
                    Ok(WatchCommand::Help) => output::print_watch_help(),
                    Ok(WatchCommand::Quit) => break,
                    Err(msg) if msg.is_empty() => {}
                    Err(msg) => eprintln!("{}", msg),
                }
            }
        }
    }
    Ok(())
}
