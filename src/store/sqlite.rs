use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::{Clock, RecordStore, StoreError, elapsed_secs, system_clock};
use crate::model::{Draft, Record, RecordId};

const SCHEMA_VERSION: i64 = 1;

const DATE_FMT: &str = "%Y-%m-%d";
const TIME_FMT: &str = "%H:%M:%S";
const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

const SELECT_COLUMNS: &str = "SELECT id, name, description, project, notes, duration_secs,
        start_date, start_time, end_at
 FROM activities";

/// SQLite-backed record store
pub struct SqliteStore {
    conn: Mutex<Connection>,
    clock: Clock,
}

impl SqliteStore {
    /// Open (creating if needed) the database file and bring the schema up to date.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir).map_err(|e| StoreError::CreateDir {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// A private in-memory database (tests)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        migrate(&conn)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
            clock: system_clock(),
        })
    }

    /// Replace the clock used to stamp new records
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

/// Bring the schema to `SCHEMA_VERSION`, tracked in `PRAGMA user_version`.
fn migrate(conn: &Connection) -> Result<(), StoreError> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version < 1 {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS activities (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                name          TEXT NOT NULL,
                description   TEXT NOT NULL DEFAULT '',
                project       TEXT NOT NULL DEFAULT '',
                notes         TEXT NOT NULL DEFAULT '',
                duration_secs INTEGER NOT NULL DEFAULT 0 CHECK(duration_secs >= 0),
                start_date    TEXT NOT NULL,
                start_time    TEXT NOT NULL,
                end_at        TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_activities_start
                ON activities(start_date, start_time);
            "#,
        )?;
        tracing::info!(from = version, to = SCHEMA_VERSION, "migrated activity schema");
    }
    conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION}"))?;
    Ok(())
}

fn duration_param(secs: u64) -> Result<i64, StoreError> {
    i64::try_from(secs).map_err(|_| StoreError::DurationOutOfRange(secs))
}

/// Raw column values; converted to a `Record` outside the rusqlite closure so
/// corrupt rows surface as `StoreError::Corrupt`.
struct RawRow {
    id: i64,
    name: String,
    description: String,
    project: String,
    notes: String,
    duration_secs: i64,
    start_date: String,
    start_time: String,
    end_at: Option<String>,
}

fn read_row(row: &Row) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        project: row.get("project")?,
        notes: row.get("notes")?,
        duration_secs: row.get("duration_secs")?,
        start_date: row.get("start_date")?,
        start_time: row.get("start_time")?,
        end_at: row.get("end_at")?,
    })
}

impl RawRow {
    fn into_record(self) -> Result<Record, StoreError> {
        let id = RecordId(self.id);
        let corrupt = |reason: String| StoreError::Corrupt { id, reason };

        let date = NaiveDate::parse_from_str(&self.start_date, DATE_FMT)
            .map_err(|_| corrupt(format!("bad start date {:?}", self.start_date)))?;
        let time = NaiveTime::parse_from_str(&self.start_time, TIME_FMT)
            .map_err(|_| corrupt(format!("bad start time {:?}", self.start_time)))?;
        let ended_at = match self.end_at {
            Some(s) => Some(
                NaiveDateTime::parse_from_str(&s, DATETIME_FMT)
                    .map_err(|_| corrupt(format!("bad end timestamp {:?}", s)))?,
            ),
            None => None,
        };
        let duration_secs = u64::try_from(self.duration_secs)
            .map_err(|_| corrupt(format!("negative duration {}", self.duration_secs)))?;

        let record = Record {
            id,
            name: self.name,
            description: self.description,
            project: self.project,
            notes: self.notes,
            duration_secs,
            started_at: date.and_time(time),
            ended_at,
        };
        if !record.span_is_valid() {
            return Err(corrupt("ends before it starts".to_string()));
        }
        Ok(record)
    }
}

fn insert_row(
    conn: &Connection,
    draft: &Draft,
    started_at: NaiveDateTime,
    ended_at: Option<NaiveDateTime>,
    duration_secs: u64,
) -> Result<RecordId, StoreError> {
    conn.execute(
        "INSERT INTO activities
            (name, description, project, notes, duration_secs, start_date, start_time, end_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            draft.name,
            draft.description,
            draft.project,
            draft.notes,
            duration_param(duration_secs)?,
            started_at.format(DATE_FMT).to_string(),
            started_at.format(TIME_FMT).to_string(),
            ended_at.map(|t| t.format(DATETIME_FMT).to_string()),
        ],
    )?;
    Ok(RecordId(conn.last_insert_rowid()))
}

fn fetch_one(conn: &Connection, id: RecordId) -> Result<Record, StoreError> {
    let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
    let raw = conn
        .query_row(&sql, [id.0], read_row)
        .optional()?
        .ok_or(StoreError::NotFound(id))?;
    raw.into_record()
}

impl RecordStore for SqliteStore {
    fn list(&self) -> Result<Vec<Record>, StoreError> {
        let conn = self.conn()?;
        let sql = format!("{SELECT_COLUMNS} ORDER BY start_date DESC, start_time DESC, id DESC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], read_row)?;

        let mut out = Vec::new();
        for raw in rows {
            out.push(raw?.into_record()?);
        }
        Ok(out)
    }

    fn insert(&self, draft: &Draft) -> Result<Record, StoreError> {
        let now = (self.clock)();
        let conn = self.conn()?;
        let id = insert_row(&conn, draft, now, Some(now), draft.duration_secs)?;
        tracing::debug!(%id, "inserted activity");
        fetch_one(&conn, id)
    }

    fn start(&self, draft: &Draft) -> Result<Record, StoreError> {
        let now = (self.clock)();
        let conn = self.conn()?;
        let id = insert_row(&conn, draft, now, None, 0)?;
        tracing::debug!(%id, "started activity");
        fetch_one(&conn, id)
    }

    fn finish(&self, id: RecordId) -> Result<Record, StoreError> {
        let now = (self.clock)();
        let conn = self.conn()?;
        let record = fetch_one(&conn, id)?;
        if !record.is_open() {
            return Err(StoreError::AlreadyEnded(id));
        }
        let ended_at = now.max(record.started_at);
        conn.execute(
            "UPDATE activities SET end_at = ?1, duration_secs = ?2 WHERE id = ?3 AND end_at IS NULL",
            params![
                ended_at.format(DATETIME_FMT).to_string(),
                duration_param(elapsed_secs(record.started_at, ended_at))?,
                id.0,
            ],
        )?;
        tracing::debug!(%id, "finished activity");
        fetch_one(&conn, id)
    }

    fn update(&self, id: RecordId, draft: &Draft) -> Result<Record, StoreError> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE activities
             SET name = ?1, description = ?2, project = ?3, notes = ?4, duration_secs = ?5
             WHERE id = ?6",
            params![
                draft.name,
                draft.description,
                draft.project,
                draft.notes,
                duration_param(draft.duration_secs)?,
                id.0,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        tracing::debug!(%id, "updated activity");
        fetch_one(&conn, id)
    }
}
