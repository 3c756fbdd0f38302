//! # chainlog-store
//!
//! `EntryStore` implementations for the chainlog ledger.
//!
//! - [`InMemoryEntryStore`]: a `Mutex`-guarded `Vec`, for tests and
//!   short-lived processes.
//! - [`JsonlEntryStore`]: a JSON-lines file, one entry per line, loaded on
//!   open and appended on insert.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chainlog_core::Ledger;
//! use chainlog_store::JsonlEntryStore;
//!
//! let ledger = Ledger::new(Box::new(JsonlEntryStore::open("chainlog.jsonl")?));
//! ```

mod log;

pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlEntryStore;
pub use memory::{Clock, InMemoryEntryStore};

// ── Tests ─────────────────────────────────────────────────────────────────────
