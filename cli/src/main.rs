//! chainlog: tamper-evident append-only log CLI
//!
//! Appends entries to a JSON-lines backed hash chain, reads them back, and
//! audits the whole chain.
//!
//! Usage:
//!   chainlog append "pump 3 restarted" --node-code 12 --tags '{"shift":"night"}'
//!   chainlog get 7
//!   chainlog list --limit 20
//!   chainlog verify
//!   chainlog watch-demo

mod config;
mod identity;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use chainlog_broadcast::SubscriberHub;
use chainlog_contracts::{tags::tags_from_json, ChainlogError, ChainlogResult, EntryId, NewEntry};
use chainlog_core::Ledger;
use chainlog_store::{InMemoryEntryStore, JsonlEntryStore};

use config::ChainlogConfig;
use identity::{resolve_author, AUTHOR_ENV};

// ── CLI definition ────────────────────────────────────────────────────────────

/// chainlog: a tamper-evident, append-only log.
///
/// Every entry commits to its predecessor with SHA-256, so any retroactive
/// edit or deletion shows up in `chainlog verify`.
#[derive(Parser)]
#[command(
    name = "chainlog",
    about = "Tamper-evident append-only log",
    long_about = "Appends hash-chained log entries to a JSON-lines store and\n\
                  verifies that no stored entry has been edited or removed."
)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON-lines store; overrides `store_path` from the config.
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Append a new entry to the chain.
    Append {
        /// Entry text.
        body: String,
        /// Node code, 0–99.
        #[arg(long, allow_negative_numbers = true)]
        node_code: Option<i64>,
        /// Input code, 0–999.
        #[arg(long, allow_negative_numbers = true)]
        input_code: Option<i64>,
        /// Tags as a JSON object.
        #[arg(long)]
        tags: Option<String>,
        /// Id of an earlier entry this one supersedes.
        #[arg(long)]
        supersedes: Option<EntryId>,
        /// Author identity; falls back to CHAINLOG_AUTHOR, then the config.
        #[arg(long)]
        author: Option<String>,
    },
    /// Print one entry.
    Get { id: EntryId },
    /// Print the newest entries, newest first.
    List {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print entries that supersede the given entry.
    SupersededBy { id: EntryId },
    /// Audit the whole chain. Exits with status 2 when breaks are found.
    Verify,
    /// Check that the configuration loads and the store opens.
    Ping,
    /// Run an in-memory ledger with a live subscriber and print its events.
    WatchDemo,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> ChainlogResult<i32> {
    let config = match &cli.config {
        Some(path) => ChainlogConfig::from_file(path)?,
        None => ChainlogConfig::default(),
    };
    let store_path = cli.store.clone().unwrap_or_else(|| config.store_path.clone());
    debug!(store = %store_path.display(), "configuration loaded");

    match cli.command {
        Command::Append {
            body,
            node_code,
            input_code,
            tags,
            supersedes,
            author,
        } => {
            let env_author = std::env::var(AUTHOR_ENV).ok();
            let author = resolve_author(
                author.as_deref(),
                env_author.as_deref(),
                config.author.as_deref(),
            )?;

            let new = NewEntry {
                author,
                body,
                node_code,
                input_code,
                tags: tags.as_deref().map(parse_tags).transpose()?,
                supersedes_id: supersedes,
            };

            let entry = open_ledger(&store_path, &config)?.append(new)?;
            print_json(&entry)?;
            Ok(0)
        }

        Command::Get { id } => {
            print_json(&open_ledger(&store_path, &config)?.get(id)?)?;
            Ok(0)
        }

        Command::List { limit } => {
            print_json(&open_ledger(&store_path, &config)?.list_recent(limit)?)?;
            Ok(0)
        }

        Command::SupersededBy { id } => {
            print_json(&open_ledger(&store_path, &config)?.superseded_by(id)?)?;
            Ok(0)
        }

        Command::Verify => {
            let report = open_ledger(&store_path, &config)?.verify()?;
            print_json(&report)?;
            Ok(if report.ok { 0 } else { 2 })
        }

        Command::Ping => {
            open_ledger(&store_path, &config)?;
            println!("{{\"status\":\"ok\"}}");
            Ok(0)
        }

        Command::WatchDemo => watch_demo(),
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn open_ledger(store_path: &Path, config: &ChainlogConfig) -> ChainlogResult<Ledger> {
    let store = JsonlEntryStore::open(store_path)?;
    Ok(Ledger::new(Box::new(store)).with_limits(config.list))
}

fn parse_tags(raw: &str) -> ChainlogResult<chainlog_contracts::Tags> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| ChainlogError::validation("tags", format!("invalid JSON: {}", e)))?;
    tags_from_json(value).map_err(|reason| ChainlogError::validation("tags", reason))
}

fn print_json<T: Serialize>(value: &T) -> ChainlogResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| ChainlogError::storage(format!("failed to encode output: {}", e)))?;
    println!("{}", text);
    Ok(())
}

// ── Watch demo ────────────────────────────────────────────────────────────────

/// Append a few entries to an in-memory ledger while a subscriber listens,
/// then audit the chain.
fn watch_demo() -> ChainlogResult<i32> {
    let hub = Arc::new(SubscriberHub::new());
    let subscription = hub.subscribe()?;

    let ledger = Ledger::new(Box::new(InMemoryEntryStore::new())).with_notifier(hub.clone());

    println!();
    println!("chainlog watch demo");
    println!("===================");
    println!();

    let first = ledger.append(NewEntry::new("demo", "valve 4 opened").with_node_code(4))?;
    ledger.append(NewEntry::new("demo", "pressure nominal").with_input_code(120))?;
    ledger.append(
        NewEntry::new("demo", "valve 4 opened at 09:12, not 09:10").with_supersedes(first.id),
    )?;

    while let Some(message) = subscription.recv_timeout(Duration::from_millis(50)) {
        println!("  event: {}", message);
    }

    let rejected = ledger.append(NewEntry::new("demo", "bad node").with_node_code(100));
    if let Err(e) = rejected {
        println!("  rejected: {}", e);
    }

    println!();
    print_json(&ledger.verify()?)?;

    hub.shutdown();
    Ok(0)
}
