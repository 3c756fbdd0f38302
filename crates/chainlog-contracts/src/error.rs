//! Error types for the chainlog ledger.
//!
//! Every fallible operation returns `ChainlogResult<T>`. Integrity breaks are
//! not errors: they are reported as data in an `IntegrityReport`.

use thiserror::Error;

use crate::entry::EntryId;

/// The unified error type for chainlog.
#[derive(Debug, Error)]
pub enum ChainlogError {
    /// Caller input was out of range or empty. Raised before any hashing or
    /// storage write takes place.
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// No entry exists with the requested id.
    #[error("log entry {id} not found")]
    NotFound { id: EntryId },

    /// The storage collaborator failed to read or persist entries.
    ///
    /// Never retried: a half-completed append must not be replayed into a
    /// duplicate entry.
    #[error("storage failure: {reason}")]
    StorageFailure { reason: String },

    /// A configuration value is missing, unreadable, or malformed.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// The subscriber hub has been shut down and accepts no new subscribers.
    #[error("subscriber hub is closed")]
    SubscriptionClosed,
}

impl ChainlogError {
    /// Shorthand for a `Validation` error on `field`.
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a `StorageFailure` with a formatted reason.
    pub fn storage(reason: impl Into<String>) -> Self {
        Self::StorageFailure {
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the chainlog crates.
pub type ChainlogResult<T> = Result<T, ChainlogError>;
