//! # chainlog-core
//!
//! The single-writer, hash-chained ledger for chainlog.
//!
//! This crate provides:
//! - The collaborator traits (`EntryStore`, `Notifier`)
//! - Per-field validators for new entries
//! - The `Ledger`, which serializes appends and audits the chain
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chainlog_core::Ledger;
//! use chainlog_contracts::NewEntry;
//!
//! let ledger = Ledger::new(Box::new(store)).with_notifier(hub);
//! let entry = ledger.append(NewEntry::new("alice", "pump 3 restarted"))?;
//! assert!(ledger.verify()?.ok);
//! ```

pub mod ledger;
pub mod traits;
pub mod validate;

pub use ledger::{Ledger, ListLimits};
pub use traits::{EntryStore, Notifier};
