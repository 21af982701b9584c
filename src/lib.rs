//! jobtrail: sync job-application email into structured application records.
//!
//! The pipeline runs in three stages. Ingestion lists and fetches mailbox
//! messages through a [`source::MessageSource`], with retries and a bounded
//! worker pool. Classification decides which messages are genuine
//! application responses and extracts employer, role, and stage.
//! Reconciliation merges the classified batch into the persisted records
//! under a monotonic stage policy, keyed by `(user_id, employer, role)`.
//!
//! [`sync::SyncEngine`] ties the stages together; the `jobtrail` binary is a
//! thin CLI over it.

pub mod classify;
pub mod config;
pub mod error;
pub mod fetch;
pub mod gmail;
pub mod model;
pub mod normalize;
pub mod reconcile;
pub mod source;
pub mod store;
pub mod sync;

pub use classify::{build_classifier, Classifier};
pub use config::{ClassifierKind, SyncConfig};
pub use error::SyncError;
pub use model::{Classification, EmailRecord, JobRecord, RecordPatch, Stage, SyncOutcome};
pub use source::{MessageSource, StaticToken, TokenProvider};
pub use store::{RecordStore, SqliteStore};
pub use sync::SyncEngine;
