//! Persistence gateway.
//!
//! The TUI only ever talks to [`RecordStore`]; calls are made from scheduler
//! worker threads, so implementations must be `Send + Sync` and do their own
//! internal locking.

pub mod memory;
pub mod sqlite;

use std::sync::Arc;

use chrono::{Local, NaiveDateTime, Timelike};

use crate::model::{Draft, Record, RecordId};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("could not create {path}: {source}")]
    CreateDir {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("activity {0} not found")]
    NotFound(RecordId),
    #[error("activity {0} has already ended")]
    AlreadyEnded(RecordId),
    #[error("activity {id} is corrupt: {reason}")]
    Corrupt { id: RecordId, reason: String },
    #[error("duration {0}s is out of range")]
    DurationOutOfRange(u64),
    #[error("store connection lock poisoned")]
    LockPoisoned,
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store operation panicked: {0}")]
    Panicked(String),
}

/// The persistence contract the controller depends on
pub trait RecordStore: Send + Sync {
    /// All records, most recent first (start date, then start time, descending)
    fn list(&self) -> Result<Vec<Record>, StoreError>;

    /// Persist a new, completed record: started and ended now
    fn insert(&self, draft: &Draft) -> Result<Record, StoreError>;

    /// Replace the draft fields of an existing record; timestamps are kept
    fn update(&self, id: RecordId, draft: &Draft) -> Result<Record, StoreError>;

    /// Persist a new, open record started now. Its duration stays 0 until
    /// [`RecordStore::finish`] derives it; the draft's duration is ignored.
    fn start(&self, draft: &Draft) -> Result<Record, StoreError>;

    /// End an open record now and set its duration from the elapsed time
    fn finish(&self, id: RecordId) -> Result<Record, StoreError>;
}

/// Source of "now" for new records
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Local wall-clock time truncated to whole seconds (the store's resolution)
pub fn system_clock() -> Clock {
    Arc::new(|| {
        let now = Local::now().naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    })
}

/// Newest first: start date and time descending, id as tie-break
pub fn sort_most_recent_first(records: &mut [Record]) {
    records.sort_by(|a, b| {
        b.started_at
            .cmp(&a.started_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// Whole seconds from `start` to `end`; 0 when the clock went backwards
pub fn elapsed_secs(start: NaiveDateTime, end: NaiveDateTime) -> u64 {
    u64::try_from((end - start).num_seconds()).unwrap_or(0)
}
