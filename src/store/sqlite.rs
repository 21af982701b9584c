//! SQLite-backed record store.
//!
//! The database lives at the configured path (default
//! `~/.jobtrail/jobtrail.db`); WAL mode is enabled for concurrent reads and
//! the schema is applied on open. `open_at` takes an explicit path for tests.

use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::{RecordStore, StoreError};
use crate::model::{JobRecord, RecordPatch, Stage};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS jobs (
    id          TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL,
    employer    TEXT NOT NULL,
    role        TEXT NOT NULL,
    stage       TEXT NOT NULL,
    applied_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_jobs_user ON jobs(user_id);
";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and apply the schema.
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(StoreError::CreateDir)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database. Test-only convenience that skips the
    /// filesystem entirely.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<(JobRecord, String, String)> {
        let record = JobRecord {
            id: row.get(0)?,
            user_id: row.get(1)?,
            employer: row.get(2)?,
            role: row.get(3)?,
            stage: Stage::Applied, // replaced by the caller after parsing
            applied_at: Utc::now(),
        };
        let stage: String = row.get(4)?;
        let applied_at: String = row.get(5)?;
        Ok((record, stage, applied_at))
    }

    fn parse_row(
        (mut record, stage, applied_at): (JobRecord, String, String),
    ) -> Result<JobRecord, StoreError> {
        record.stage = Stage::from_str(&stage).map_err(|reason| StoreError::CorruptRow {
            id: record.id.clone(),
            reason,
        })?;
        record.applied_at = DateTime::parse_from_rfc3339(&applied_at)
            .map(|d| d.with_timezone(&Utc))
            .map_err(|e| StoreError::CorruptRow {
                id: record.id.clone(),
                reason: format!("bad applied_at: {e}"),
            })?;
        Ok(record)
    }
}

impl RecordStore for SqliteStore {
    fn list_records(&self, user_id: &str) -> Result<Vec<JobRecord>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, employer, role, stage, applied_at
             FROM jobs WHERE user_id = ?1
             ORDER BY applied_at DESC",
        )?;
        let rows = stmt.query_map(params![user_id], Self::row_to_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(Self::parse_row(row?)?);
        }
        Ok(records)
    }

    fn insert_records(&self, records: &[JobRecord]) -> Result<Vec<JobRecord>, StoreError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let tx = conn.transaction()?;
        for record in records {
            tx.execute(
                "INSERT INTO jobs (id, user_id, employer, role, stage, applied_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.id,
                    record.user_id,
                    record.employer,
                    record.role,
                    record.stage.as_str(),
                    record.applied_at.to_rfc3339(),
                ],
            )?;
        }
        tx.commit()?;
        log::debug!("inserted {} records", records.len());
        Ok(records.to_vec())
    }

    fn update_records(&self, patches: &[RecordPatch]) -> Result<Vec<JobRecord>, StoreError> {
        if patches.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let tx = conn.transaction()?;
        let mut updated = Vec::with_capacity(patches.len());
        for patch in patches {
            let changed = tx.execute(
                "UPDATE jobs SET stage = ?1, applied_at = ?2 WHERE id = ?3",
                params![
                    patch.stage.as_str(),
                    patch.applied_at.to_rfc3339(),
                    patch.id
                ],
            )?;
            if changed == 0 {
                return Err(StoreError::MissingRecord(patch.id.clone()));
            }
            let record = tx.query_row(
                "SELECT id, user_id, employer, role, stage, applied_at
                 FROM jobs WHERE id = ?1",
                params![patch.id],
                Self::row_to_record,
            )?;
            updated.push(Self::parse_row(record)?);
        }
        tx.commit()?;
        log::debug!("updated {} records", updated.len());
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(id: &str, user: &str, employer: &str, stage: Stage) -> JobRecord {
        JobRecord {
            id: id.to_string(),
            user_id: user.to_string(),
            employer: employer.to_string(),
            role: "Software Engineer".to_string(),
            stage,
            applied_at: Utc.with_ymd_and_hms(2024, 5, 13, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_insert_and_list_roundtrip() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_records(&[
                record("r1", "u1", "Acme", Stage::Applied),
                record("r2", "u1", "Initech", Stage::Interviewing),
                record("r3", "u2", "Globex", Stage::Offered),
            ])
            .unwrap();

        let u1 = store.list_records("u1").unwrap();
        assert_eq!(u1.len(), 2);
        assert!(u1.iter().all(|r| r.user_id == "u1"));

        let u2 = store.list_records("u2").unwrap();
        assert_eq!(u2.len(), 1);
        assert_eq!(u2[0].employer, "Globex");
        assert_eq!(u2[0].stage, Stage::Offered);
        assert_eq!(
            u2[0].applied_at,
            Utc.with_ymd_and_hms(2024, 5, 13, 9, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_list_unknown_user_is_empty() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.list_records("nobody").unwrap().is_empty());
    }

    #[test]
    fn test_update_changes_stage_and_timestamp() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_records(&[record("r1", "u1", "Acme", Stage::Applied)])
            .unwrap();

        let later = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let updated = store
            .update_records(&[RecordPatch {
                id: "r1".to_string(),
                stage: Stage::Rejected,
                applied_at: later,
            }])
            .unwrap();

        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].stage, Stage::Rejected);
        assert_eq!(updated[0].applied_at, later);
    }

    #[test]
    fn test_update_missing_record_errors() {
        let store = SqliteStore::open_in_memory().unwrap();
        let result = store.update_records(&[RecordPatch {
            id: "ghost".to_string(),
            stage: Stage::Applied,
            applied_at: Utc::now(),
        }]);
        assert!(matches!(result, Err(StoreError::MissingRecord(_))));
    }

    #[test]
    fn test_open_at_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.db");
        {
            let store = SqliteStore::open_at(&path).unwrap();
            store
                .insert_records(&[record("r1", "u1", "Acme", Stage::Applied)])
                .unwrap();
        }
        let store = SqliteStore::open_at(&path).unwrap();
        assert_eq!(store.list_records("u1").unwrap().len(), 1);
    }
}
