//! JSON-lines file implementation of `EntryStore`.
//!
//! One `LogEntry` JSON object per line, in insertion order. The file is read
//! in full on open and every insert appends and flushes a single line before
//! the entry becomes visible to readers. Nothing ever rewrites a line.
//!
//! A write that fails part way is truncated back off the file, so a failed
//! insert leaves neither a duplicate id nor a torn line behind. A torn final
//! line left by a crash is dropped on the next open.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use chainlog_contracts::{ChainlogError, ChainlogResult, EntryId, LinkedEntry, LogEntry};
use chainlog_core::traits::EntryStore;

use crate::log::EntryLog;

/// A durable, append-only entry store backed by a JSON-lines file.
pub struct JsonlEntryStore {
    path: PathBuf,
    state: Mutex<EntryLog>,
    /// Set when a failed write could not be rolled back. The file may then
    /// hold a line memory does not, so inserts are refused until reopen.
    failed: AtomicBool,
}

impl JsonlEntryStore {
    /// Open the store at `path`, creating an empty file if none exists.
    ///
    /// # Errors
    ///
    /// `StorageFailure` if the file cannot be read or a line does not decode
    /// as a `LogEntry`; the reason names the offending line.
    pub fn open(path: impl AsRef<Path>) -> ChainlogResult<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = if path.exists() {
            let (entries, tail) = read_entries(&path)?;
            repair_tail(&path, tail)?;
            entries
        } else {
            File::create(&path).map_err(|e| {
                ChainlogError::storage(format!("failed to create '{}': {}", path.display(), e))
            })?;
            Vec::new()
        };

        info!(path = %path.display(), entries = entries.len(), "opened entry store");

        Ok(Self {
            path,
            state: Mutex::new(EntryLog::from_entries(entries)),
            failed: AtomicBool::new(false),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> ChainlogResult<MutexGuard<'_, EntryLog>> {
        self.state
            .lock()
            .map_err(|e| ChainlogError::storage(format!("entry store lock poisoned: {}", e)))
    }

    fn append_line(&self, entry: &LogEntry) -> ChainlogResult<()> {
        let mut line = serde_json::to_string(entry)
            .map_err(|e| ChainlogError::storage(format!("failed to encode entry {}: {}", entry.id, e)))?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| ChainlogError::storage(format!("failed to open '{}': {}", self.path.display(), e)))?;

        append_or_rollback(&mut file, line.as_bytes(), File::sync_data).map_err(|failure| {
            if let WriteFailure::RollbackFailed { .. } = failure {
                self.failed.store(true, Ordering::SeqCst);
                error!(path = %self.path.display(), "rollback failed; refusing further inserts");
            }
            ChainlogError::storage(format!("failed to write '{}': {}", self.path.display(), failure))
        })
    }
}

/// Why `append_or_rollback` failed.
#[derive(Debug)]
enum WriteFailure {
    /// The write failed and the file is back at its previous length.
    RolledBack(io::Error),
    /// The write failed and so did truncating it away.
    RollbackFailed { write: io::Error, truncate: io::Error },
}

impl std::fmt::Display for WriteFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteFailure::RolledBack(e) => write!(f, "{}", e),
            WriteFailure::RollbackFailed { write, truncate } => {
                write!(f, "{} (rollback also failed: {})", write, truncate)
            }
        }
    }
}

/// Append `bytes` and run `sync`; on any error, cut the file back to the
/// length it had before.
fn append_or_rollback(
    file: &mut File,
    bytes: &[u8],
    sync: impl FnOnce(&File) -> io::Result<()>,
) -> Result<(), WriteFailure> {
    let start = file.metadata().map_err(WriteFailure::RolledBack)?.len();

    let written = file.write_all(bytes).and_then(|_| sync(&*file));
    match written {
        Ok(()) => Ok(()),
        Err(write) => match file.set_len(start) {
            Ok(()) => {
                warn!(error = %write, restored_len = start, "write failed; file rolled back");
                Err(WriteFailure::RolledBack(write))
            }
            Err(truncate) => Err(WriteFailure::RollbackFailed { write, truncate }),
        },
    }
}

/// State of the file's final line after loading.
#[derive(Debug, PartialEq, Eq)]
enum Tail {
    Clean,
    /// The last entry decoded but has no trailing newline.
    MissingNewline,
    /// The last line has no newline and does not decode; cut the file back
    /// to this length.
    Torn(u64),
}

/// Load every entry. Only the final line may be torn; a bad line anywhere
/// else is an error.
fn read_entries(path: &Path) -> ChainlogResult<(Vec<LogEntry>, Tail)> {
    let contents = fs::read_to_string(path)
        .map_err(|e| ChainlogError::storage(format!("failed to read '{}': {}", path.display(), e)))?;

    let mut entries = Vec::new();
    let mut offset = 0usize;
    for (index, raw) in contents.split_inclusive('\n').enumerate() {
        let line_start = offset;
        offset += raw.len();

        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<LogEntry>(line) {
            Ok(entry) => entries.push(entry),
            Err(_) if !raw.ends_with('\n') => return Ok((entries, Tail::Torn(line_start as u64))),
            Err(e) => {
                return Err(ChainlogError::storage(format!(
                    "'{}' line {}: invalid entry: {}",
                    path.display(),
                    index + 1,
                    e
                )))
            }
        }
    }

    let tail = if contents.is_empty() || contents.ends_with('\n') {
        Tail::Clean
    } else {
        Tail::MissingNewline
    };
    Ok((entries, tail))
}

fn repair_tail(path: &Path, tail: Tail) -> ChainlogResult<()> {
    let result = match tail {
        Tail::Clean => return Ok(()),
        Tail::MissingNewline => {
            debug!(path = %path.display(), "terminating final line");
            OpenOptions::new()
                .append(true)
                .open(path)
                .and_then(|mut file| file.write_all(b"\n"))
        }
        Tail::Torn(len) => {
            warn!(path = %path.display(), truncate_to = len, "dropping torn final line");
            OpenOptions::new()
                .write(true)
                .open(path)
                .and_then(|file| file.set_len(len))
        }
    };
    result.map_err(|e| ChainlogError::storage(format!("failed to repair '{}': {}", path.display(), e)))
}

impl EntryStore for JsonlEntryStore {
    /// The line is written under the state lock and before the entry is
    /// committed to memory, so readers never see an entry that is not on
    /// disk and file order matches id order.
    fn insert(&self, entry: LinkedEntry) -> ChainlogResult<LogEntry> {
        let mut state = self.lock()?;
        if self.failed.load(Ordering::SeqCst) {
            return Err(ChainlogError::storage(format!(
                "'{}' is in an unknown state after a failed write; reopen the store",
                self.path.display()
            )));
        }

        let stored = state.stamp(entry, Utc::now());
        self.append_line(&stored)?;
        state.commit(stored.clone());

        debug!(id = stored.id, path = %self.path.display(), "entry appended to file");
        Ok(stored)
    }

    fn latest(&self) -> ChainlogResult<Option<LogEntry>> {
        Ok(self.lock()?.latest().cloned())
    }

    fn get(&self, id: EntryId) -> ChainlogResult<Option<LogEntry>> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn list_chronological(&self, limit: Option<usize>) -> ChainlogResult<Vec<LogEntry>> {
        Ok(self.lock()?.chronological(limit))
    }

    fn list_recent(&self, limit: usize) -> ChainlogResult<Vec<LogEntry>> {
        Ok(self.lock()?.recent(limit))
    }
}

#[cfg(test)]
mod tests {
    use std::fs::{self, OpenOptions};
    use std::io;

    use super::{append_or_rollback, read_entries, Tail, WriteFailure};

    #[test]
    fn failed_sync_truncates_the_written_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.jsonl");
        fs::write(&path, "kept\n").unwrap();

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        let result = append_or_rollback(&mut file, b"{\"id\":2}\n", |_| {
            Err(io::Error::new(io::ErrorKind::Other, "disk went away"))
        });

        assert!(matches!(result, Err(WriteFailure::RolledBack(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), "kept\n");
    }

    #[test]
    fn successful_append_keeps_the_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.jsonl");
        fs::write(&path, "").unwrap();

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        append_or_rollback(&mut file, b"line\n", |_| Ok(())).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "line\n");
    }

    #[test]
    fn read_entries_classifies_the_tail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.jsonl");

        fs::write(&path, "").unwrap();
        assert_eq!(read_entries(&path).unwrap().1, Tail::Clean);

        fs::write(&path, "{\"id\":1,\"aut").unwrap();
        let (entries, tail) = read_entries(&path).unwrap();
        assert!(entries.is_empty());
        assert_eq!(tail, Tail::Torn(0));
    }
}
