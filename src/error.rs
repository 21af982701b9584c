//! Top-level error type for sync operations.
//!
//! Per-message fetch failures never surface here. They degrade to skipped
//! messages inside the fetcher. What remains is failures of the batch
//! itself: listing the mailbox and talking to the record store.

use thiserror::Error;

use crate::source::SourceError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Message source error: {0}")]
    Source(#[from] SourceError),

    #[error("Record store error: {0}")]
    Store(#[from] StoreError),
}
