use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDateTime;

use super::{Clock, RecordStore, StoreError, elapsed_secs, sort_most_recent_first, system_clock};
use crate::model::{Draft, Record, RecordId};

#[derive(Default)]
struct Inner {
    records: Vec<Record>,
    next_id: i64,
    fail_next: Option<String>,
    calls: Vec<&'static str>,
}

/// Record store kept in memory. Used by tests and for failure injection.
pub struct MemoryStore {
    inner: Mutex<Inner>,
    clock: Clock,
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            inner: Mutex::new(Inner {
                next_id: 1,
                ..Inner::default()
            }),
            clock: system_clock(),
        }
    }

    /// Start from the given records; new ids continue after the largest one.
    pub fn with_records(records: Vec<Record>) -> Self {
        let next_id = records.iter().map(|r| r.id.0).max().unwrap_or(0) + 1;
        MemoryStore {
            inner: Mutex::new(Inner {
                records,
                next_id,
                ..Inner::default()
            }),
            clock: system_clock(),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Make the next call fail with `StoreError::Unavailable(reason)`
    pub fn fail_next(&self, reason: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_next = Some(reason.to_string());
        }
    }

    /// Names of the operations called so far ("list", "insert", "update", ...)
    pub fn calls(&self) -> Vec<&'static str> {
        self.inner.lock().map(|i| i.calls.clone()).unwrap_or_default()
    }

    /// Current contents, unsorted
    pub fn snapshot(&self) -> Vec<Record> {
        self.inner.lock().map(|i| i.records.clone()).unwrap_or_default()
    }

    fn begin(&self, call: &'static str) -> Result<MutexGuard<'_, Inner>, StoreError> {
        let mut inner = self.inner.lock().map_err(|_| StoreError::LockPoisoned)?;
        inner.calls.push(call);
        if let Some(reason) = inner.fail_next.take() {
            return Err(StoreError::Unavailable(reason));
        }
        Ok(inner)
    }
}

impl RecordStore for MemoryStore {
    fn list(&self) -> Result<Vec<Record>, StoreError> {
        let inner = self.begin("list")?;
        let mut records = inner.records.clone();
        sort_most_recent_first(&mut records);
        Ok(records)
    }

    fn insert(&self, draft: &Draft) -> Result<Record, StoreError> {
        let now = (self.clock)();
        let inner = self.begin("insert")?;
        Ok(push_record(inner, draft, now, Some(now), draft.duration_secs))
    }

    fn start(&self, draft: &Draft) -> Result<Record, StoreError> {
        let now = (self.clock)();
        let inner = self.begin("start")?;
        Ok(push_record(inner, draft, now, None, 0))
    }

    fn finish(&self, id: RecordId) -> Result<Record, StoreError> {
        let now = (self.clock)();
        let mut inner = self.begin("finish")?;
        let record = inner
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;
        if !record.is_open() {
            return Err(StoreError::AlreadyEnded(id));
        }
        record.ended_at = Some(now.max(record.started_at));
        record.duration_secs = elapsed_secs(record.started_at, now);
        Ok(record.clone())
    }

    fn update(&self, id: RecordId, draft: &Draft) -> Result<Record, StoreError> {
        let mut inner = self.begin("update")?;
        let record = inner
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;
        record.name = draft.name.clone();
        record.description = draft.description.clone();
        record.project = draft.project.clone();
        record.notes = draft.notes.clone();
        record.duration_secs = draft.duration_secs;
        Ok(record.clone())
    }
}

fn push_record(
    mut inner: MutexGuard<'_, Inner>,
    draft: &Draft,
    started_at: NaiveDateTime,
    ended_at: Option<NaiveDateTime>,
    duration_secs: u64,
) -> Record {
    let id = RecordId(inner.next_id);
    inner.next_id += 1;
    let record = Record {
        id,
        name: draft.name.clone(),
        description: draft.description.clone(),
        project: draft.project.clone(),
        notes: draft.notes.clone(),
        duration_secs,
        started_at,
        ended_at,
    };
    inner.records.push(record.clone());
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn record(id: i64, name: &str, day: u32) -> Record {
        let t = NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        Record {
            id: RecordId(id),
            name: name.into(),
            description: String::new(),
            project: String::new(),
            notes: String::new(),
            duration_secs: 0,
            started_at: t,
            ended_at: Some(t),
        }
    }

    #[test]
    fn test_list_is_most_recent_first() {
        let store = MemoryStore::with_records(vec![record(1, "B", 1), record(2, "A", 2)]);
        let names: Vec<String> = store.list().unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_insert_continues_after_seeded_ids() {
        let store = MemoryStore::with_records(vec![record(5, "seed", 1)]);
        let draft = record(0, "new", 1).to_draft();
        assert_eq!(store.insert(&draft).unwrap().id, RecordId(6));
    }

    #[test]
    fn test_fail_next_fails_exactly_once() {
        let store = MemoryStore::new();
        store.fail_next("disk on fire");
        assert!(matches!(store.list(), Err(StoreError::Unavailable(r)) if r == "disk on fire"));
        assert!(store.list().is_ok());
        assert_eq!(store.calls(), vec!["list", "list"]);
    }

    #[test]
    fn test_start_then_finish_derives_duration() {
        let t0 = record(0, "x", 1).started_at;
        let store = MemoryStore::new().with_clock(Arc::new(move || t0));
        let open = store.start(&record(0, "Write spec", 1).to_draft()).unwrap();
        assert!(open.is_open());
        assert_eq!(open.duration_secs, 0);

        let store = store.with_clock(Arc::new(move || t0 + chrono::Duration::minutes(90)));
        let done = store.finish(open.id).unwrap();
        assert_eq!(done.ended_at, Some(t0 + chrono::Duration::minutes(90)));
        assert_eq!(done.duration_secs, 5400);
        assert!(matches!(store.finish(open.id), Err(StoreError::AlreadyEnded(_))));
        assert_eq!(store.calls(), vec!["start", "finish", "finish"]);
    }

    #[test]
    fn test_update_unknown_is_not_found() {
        let store = MemoryStore::new();
        let draft = record(0, "x", 1).to_draft();
        assert!(matches!(
            store.update(RecordId(3), &draft),
            Err(StoreError::NotFound(RecordId(3)))
        ));
    }
}
