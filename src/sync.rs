//! Sync orchestration: mailbox listing and fetch, classification,
//! reconciliation, and persistence, in that order.
//!
//! Concurrent syncs for different users run freely. Concurrent syncs for the
//! same user are serialized around the read-plan-write section, so two
//! overlapping calls cannot both insert a record for the same
//! `(employer, role)` key.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::classify::Classifier;
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::fetch::Fetcher;
use crate::model::{Classification, SyncOutcome};
use crate::reconcile;
use crate::source::MessageSource;
use crate::store::RecordStore;

pub struct SyncEngine {
    fetcher: Fetcher,
    classifier: Arc<dyn Classifier>,
    store: Arc<dyn RecordStore>,
    config: SyncConfig,
    user_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SyncEngine {
    pub fn new(
        source: Arc<dyn MessageSource>,
        classifier: Arc<dyn Classifier>,
        store: Arc<dyn RecordStore>,
        config: SyncConfig,
    ) -> Self {
        Self {
            fetcher: Fetcher::new(source, &config),
            classifier,
            store,
            config,
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Run one full sync for a user.
    ///
    /// Listing failures (after retries) and store failures surface as
    /// errors. Per-message fetch failures are already absorbed by the
    /// fetcher and show up only as a smaller processed count.
    pub async fn sync_user(&self, user_id: &str) -> Result<SyncOutcome, SyncError> {
        let ids = self
            .fetcher
            .list_ids(&self.config.search_query, self.config.max_results)
            .await?;
        let emails = self.fetcher.fetch_all(ids).await;
        let processed = emails.len();

        let batch: Vec<Classification> = emails
            .iter()
            .filter_map(|email| self.classifier.classify(email))
            .collect();
        log::info!(
            "sync for {}: {} messages fetched, {} admitted as application responses",
            user_id,
            processed,
            batch.len()
        );

        let lock = self.user_lock(user_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.apply_batch(user_id, processed, &batch)
        };
        self.release_user_lock(user_id, lock).await;
        result
    }

    fn apply_batch(
        &self,
        user_id: &str,
        processed: usize,
        batch: &[Classification],
    ) -> Result<SyncOutcome, SyncError> {
        let existing = self.store.list_records(user_id)?;
        let plan = reconcile::plan(user_id, batch, &existing);
        if plan.is_empty() {
            return Ok(SyncOutcome {
                processed,
                records: Vec::new(),
            });
        }

        let mut records = self.store.insert_records(&plan.inserts)?;
        records.extend(self.store.update_records(&plan.updates)?);
        Ok(SyncOutcome { processed, records })
    }

    async fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.user_locks.lock().await;
        Arc::clone(
            locks
                .entry(user_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    /// Drop the map entry once no other sync holds the lock, so the map
    /// stays bounded by the number of in-flight syncs rather than growing
    /// with every user id ever seen.
    async fn release_user_lock(&self, user_id: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.user_locks.lock().await;
        // Two strong refs means the map and us; nobody else is waiting.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(user_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use chrono::Utc;

    use crate::model::{EmailRecord, JobRecord, RecordPatch, Stage};
    use crate::source::{MessageId, RawMessage, SourceError};
    use crate::store::sqlite::SqliteStore;
    use crate::store::StoreError;

    struct EmptySource;

    #[async_trait]
    impl MessageSource for EmptySource {
        async fn list_message_ids(
            &self,
            _query: &str,
            _limit: u32,
        ) -> Result<Vec<MessageId>, SourceError> {
            Ok(Vec::new())
        }

        async fn get_message(&self, id: &MessageId) -> Result<RawMessage, SourceError> {
            Err(SourceError::NotFound(id.clone()))
        }
    }

    struct BrokenListSource;

    #[async_trait]
    impl MessageSource for BrokenListSource {
        async fn list_message_ids(
            &self,
            _query: &str,
            _limit: u32,
        ) -> Result<Vec<MessageId>, SourceError> {
            Err(SourceError::AuthExpired)
        }

        async fn get_message(&self, id: &MessageId) -> Result<RawMessage, SourceError> {
            Err(SourceError::NotFound(id.clone()))
        }
    }

    struct Admitting;

    impl Classifier for Admitting {
        fn classify(&self, _email: &EmailRecord) -> Option<Classification> {
            Some(Classification {
                employer: "Acme".to_string(),
                role: "Software Engineer".to_string(),
                stage: Stage::Applied,
                applied_at: Utc::now(),
            })
        }
    }

    struct FailingStore;

    impl RecordStore for FailingStore {
        fn list_records(&self, _user_id: &str) -> Result<Vec<JobRecord>, StoreError> {
            Err(StoreError::Poisoned)
        }

        fn insert_records(&self, _records: &[JobRecord]) -> Result<Vec<JobRecord>, StoreError> {
            Err(StoreError::Poisoned)
        }

        fn update_records(&self, _patches: &[RecordPatch]) -> Result<Vec<JobRecord>, StoreError> {
            Err(StoreError::Poisoned)
        }
    }

    fn quiet_config() -> SyncConfig {
        SyncConfig {
            max_retries: 1,
            retry_delay_base_ms: 1,
            ..SyncConfig::default()
        }
    }

    #[tokio::test]
    async fn test_empty_mailbox_yields_empty_outcome() {
        let store = SqliteStore::open_in_memory().unwrap();
        let engine = SyncEngine::new(
            Arc::new(EmptySource),
            Arc::new(Admitting),
            Arc::new(store),
            quiet_config(),
        );
        let outcome = engine.sync_user("u1").await.unwrap();
        assert_eq!(outcome.processed, 0);
        assert!(outcome.records.is_empty());
    }

    #[tokio::test]
    async fn test_listing_failure_surfaces() {
        let store = SqliteStore::open_in_memory().unwrap();
        let engine = SyncEngine::new(
            Arc::new(BrokenListSource),
            Arc::new(Admitting),
            Arc::new(store),
            quiet_config(),
        );
        let err = engine.sync_user("u1").await.unwrap_err();
        assert!(matches!(err, SyncError::Source(SourceError::AuthExpired)));
    }

    #[tokio::test]
    async fn test_store_failure_surfaces() {
        let engine = SyncEngine::new(
            Arc::new(EmptySource),
            Arc::new(Admitting),
            Arc::new(FailingStore),
            quiet_config(),
        );
        let err = engine.sync_user("u1").await.unwrap_err();
        assert!(matches!(err, SyncError::Store(StoreError::Poisoned)));
    }

    #[tokio::test]
    async fn test_user_lock_is_reused_per_user() {
        let store = SqliteStore::open_in_memory().unwrap();
        let engine = SyncEngine::new(
            Arc::new(EmptySource),
            Arc::new(Admitting),
            Arc::new(store),
            quiet_config(),
        );
        let a = engine.user_lock("u1").await;
        let b = engine.user_lock("u1").await;
        let c = engine.user_lock("u2").await;
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[tokio::test]
    async fn test_user_lock_entry_evicted_after_sync() {
        let store = SqliteStore::open_in_memory().unwrap();
        let engine = SyncEngine::new(
            Arc::new(EmptySource),
            Arc::new(Admitting),
            Arc::new(store),
            quiet_config(),
        );
        engine.sync_user("u1").await.unwrap();
        engine.sync_user("u2").await.unwrap();
        assert!(engine.user_locks.lock().await.is_empty());
    }
}
