//! Terminal output for the command-line consumer.

use anyhow::Result;
use thronecache_core::{CachedData, Character, LoadOutcome, Snapshot, SyncError, SyncRequest};

use crate::app::App;

fn format_row(character: &Character) -> String {
    match character.id {
        Some(id) => format!("{:>5}  {}", id, character),
        None => format!("{:>5}  {}", "-", character),
    }
}

pub fn print_characters(characters: &[Character]) {
    if characters.is_empty() {
        println!("(cache is empty)");
        return;
    }
    for character in characters {
        println!("{}", format_row(character));
    }
}

pub fn print_snapshot(snapshot: &Snapshot) {
    println!("--- version {} ({} characters) ---", snapshot.version, snapshot.len());
    print_characters(snapshot);
}

pub fn print_outcome(outcome: &LoadOutcome) {
    match outcome {
        LoadOutcome::CacheHit { cached } => {
            println!("Served {} cached characters (use `refresh` to refetch).", cached)
        }
        LoadOutcome::Fetched { page, inserted } => {
            println!("Fetched page {}: {} characters.", page, inserted)
        }
    }
}

pub fn print_failure(request: &SyncRequest, error: &SyncError) {
    eprintln!("Request '{}' failed: {}", request, error);
}

/// Count, age and staleness lines for `status`.
fn freshness_lines(freshness: Option<&CachedData<usize>>) -> [String; 3] {
    match freshness {
        Some(cached) => [
            format!("Characters:       {}", cached.data),
            format!("Last updated:     {}", cached.age_display()),
            format!("Stale:            {}", if cached.is_stale() { "yes" } else { "no" }),
        ],
        None => [
            "Characters:       0".to_string(),
            "Last updated:     never".to_string(),
            "Stale:            yes".to_string(),
        ],
    }
}

pub fn print_status(app: &App) -> Result<()> {
    let freshness = app.sync.freshness()?;
    for line in freshness_lines(freshness.as_ref()) {
        println!("{}", line);
    }
    if let Some(path) = app.sync.cache_path() {
        println!("Cache file:       {}", path.display());
    }
    println!("API:              {}", app.config.api_base_url());
    println!("Refresh strategy: {:?}", app.sync.strategy());
    println!("Refresh page:     {}", app.config.default_refresh_page());
    Ok(())
}

pub fn print_watch_help() {
    println!("Commands: page <N> | refresh [N] | list | help | quit");
}
