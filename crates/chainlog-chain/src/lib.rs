//! # chainlog-chain
//!
//! Canonical payload encoding and SHA-256 hash chaining for the chainlog
//! ledger.
//!
//! ## Overview
//!
//! Every entry's `curr_hash` is the SHA-256 of its predecessor's hash
//! followed by the canonical encoding of its six logical fields. Editing any
//! hashed field of a stored entry makes its `curr_hash` disagree with the
//! recomputed value, which `verify_chain` reports.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chainlog_chain::{canonical_payload, chain_hash, verify_chain};
//!
//! let payload = canonical_payload("alice", "hello", Some(7), None, None, None);
//! let genesis = chain_hash(None, &payload);
//!
//! let report = verify_chain(&entries);
//! assert!(report.ok);
//! ```

pub mod canonical;
pub mod chain;

pub use canonical::{canonical_payload, entry_payload, linked_payload};
pub use chain::{chain_hash, chronological, expected_hash, verify_chain};

// ── Tests ─────────────────────────────────────────────────────────────────────
