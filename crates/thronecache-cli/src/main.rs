//! thronecache - a local cache of Ice and Fire characters.
//!
//! Loads pages from the remote catalog only when the cache is empty or a
//! refresh is requested, and prints whatever the cache currently holds.

mod app;
mod commands;
mod output;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use thronecache_core::{Config, PageNumber};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;

/// Log file name inside the cache directory
const LOG_FILE: &str = "thronecache.log";

#[derive(Parser)]
#[command(name = "thronecache", version, about = "Offline cache for Ice and Fire characters")]
struct Cli {
    /// Write logs to a file in the cache directory instead of stderr
    #[arg(long, global = true)]
    log_file: bool,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load a page, unless anything is already cached
    Page {
        /// Page number, starting at 1
        page: PageNumber,
    },
    /// Refetch a page and replace the cache
    Refresh {
        /// Page number (defaults to the configured refresh page)
        page: Option<PageNumber>,
    },
    /// Print cached characters without touching the network
    List,
    /// Show cache size and age
    Status,
    /// Remove every cached character
    Clear,
    /// Write cached characters to a text file
    Export {
        file: PathBuf,
        /// Keep a copy of the existing file as <file>.bak first
        #[arg(long)]
        backup: bool,
    },
    /// Delete an export, keeping a backup to restore from
    Delete {
        file: PathBuf,
        /// Where to keep the backup (defaults to <file>.bak)
        #[arg(long, value_name = "PATH")]
        backup: Option<PathBuf>,
    },
    /// Restore an export from its backup, then remove the backup
    Restore {
        file: PathBuf,
        /// Backup to restore from (defaults to <file>.bak)
        #[arg(long, value_name = "PATH")]
        backup: Option<PathBuf>,
    },
    /// Follow the cache live; type `page N`, `refresh [N]` or `quit`
    Watch,
}

/// Initialize the tracing subscriber for logging.
/// Use RUST_LOG to control the level (e.g., RUST_LOG=debug).
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

fn load_config(path: Option<&Path>) -> Config {
    let loaded = match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    loaded.unwrap_or_else(|e| {
        eprintln!("Warning: {:#}. Using default configuration.", e);
        Config::default()
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    let log_dir = if cli.log_file {
        let dir = config.cache_dir()?;
        std::fs::create_dir_all(&dir)?;
        Some(dir)
    } else {
        None
    };
    let _guard = init_tracing(log_dir.as_deref());
    info!("thronecache starting");

    let app = App::new(config)?;
    let result = commands::run(&app, cli.command).await;

    if let Err(ref e) = result {
        warn!(error = %e, "Command failed");
    }
    info!("thronecache shutting down");
    result
}
