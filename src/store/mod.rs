//! Record-store seam: the narrow interface the reconciler's output is
//! applied through. The SQLite implementation lives in `sqlite.rs`; tests
//! may substitute an in-memory fake.

pub mod sqlite;

pub use sqlite::SqliteStore;

use crate::model::{JobRecord, RecordPatch};

/// Errors specific to record storage.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to create database directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Corrupt row {id}: {reason}")]
    CorruptRow { id: String, reason: String },

    #[error("Store connection poisoned")]
    Poisoned,

    #[error("No record with id {0}")]
    MissingRecord(String),
}

/// Persistence for application records. Ids arrive pre-assigned on insert;
/// the business-key invariant is the reconciler's job, not the store's.
pub trait RecordStore: Send + Sync {
    /// All records for one user.
    fn list_records(&self, user_id: &str) -> Result<Vec<JobRecord>, StoreError>;

    /// Insert a batch, returning the stored records.
    fn insert_records(&self, records: &[JobRecord]) -> Result<Vec<JobRecord>, StoreError>;

    /// Apply field-level patches, returning the updated records.
    fn update_records(&self, patches: &[RecordPatch]) -> Result<Vec<JobRecord>, StoreError>;
}
