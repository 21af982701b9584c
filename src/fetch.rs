//! Retrying fetcher: bounded retry/backoff around source calls, plus a
//! bounded worker pool for per-message fetches.
//!
//! A failed individual fetch is dropped, never fatal to the batch. Workers
//! pull from a shared cursor and results are re-ordered to the input id
//! order, so the output is deterministic regardless of completion order.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;

use crate::config::SyncConfig;
use crate::model::EmailRecord;
use crate::normalize;
use crate::source::{MessageId, MessageSource, RawMessage, SourceError};

// ============================================================================
// Retry policy
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    Fixed,
    Exponential,
}

/// One policy object shared by listing and per-message fetch.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(30),
            backoff: Backoff::Exponential,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            base_delay: Duration::from_millis(config.retry_delay_base_ms),
            max_delay: Duration::from_secs(30),
            backoff: if config.exponential_backoff {
                Backoff::Exponential
            } else {
                Backoff::Fixed
            },
        }
    }

    /// Delay before the attempt *after* `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.base_delay.min(self.max_delay),
            Backoff::Exponential => {
                let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
                self.base_delay
                    .saturating_mul(factor)
                    .min(self.max_delay)
            }
        }
    }
}

/// Run `op` up to `policy.max_attempts` times, retrying transient failures
/// with backoff. Permanent failures return immediately.
pub async fn retry<T, F, Fut>(
    policy: &RetryPolicy,
    what: &str,
    mut op: F,
) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                log::warn!(
                    "{} attempt {}/{} failed: {} (retrying in {:?})",
                    what,
                    attempt,
                    policy.max_attempts,
                    err,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                if err.is_transient() {
                    log::warn!(
                        "{} failed after {} attempts: {}",
                        what,
                        policy.max_attempts,
                        err
                    );
                } else {
                    log::debug!("{} failed (not retryable): {}", what, err);
                }
                return Err(err);
            }
        }
    }
}

// ============================================================================
// Fetcher
// ============================================================================

/// Best-effort batch fetcher over a `MessageSource`.
pub struct Fetcher {
    source: Arc<dyn MessageSource>,
    policy: RetryPolicy,
    fetch_timeout: Duration,
    concurrency: usize,
    max_body_length: usize,
}

impl Fetcher {
    pub fn new(source: Arc<dyn MessageSource>, config: &SyncConfig) -> Self {
        Self {
            source,
            policy: RetryPolicy::from_config(config),
            fetch_timeout: Duration::from_secs(config.fetch_timeout_secs),
            concurrency: config.concurrency.max(1),
            max_body_length: config.max_body_length,
        }
    }

    /// List candidate message ids. Sequential, retried under the same policy
    /// as per-message fetches.
    pub async fn list_ids(&self, query: &str, limit: u32) -> Result<Vec<MessageId>, SourceError> {
        let source = Arc::clone(&self.source);
        retry(&self.policy, "list messages", || {
            let source = Arc::clone(&source);
            let query = query.to_string();
            async move { source.list_message_ids(&query, limit).await }
        })
        .await
    }

    /// Fetch and normalize every message in `ids`. Failures after the retry
    /// budget are logged and dropped; output preserves input order.
    pub async fn fetch_all(&self, ids: Vec<MessageId>) -> Vec<EmailRecord> {
        if ids.is_empty() {
            return Vec::new();
        }

        let ids = Arc::new(ids);
        let cursor = Arc::new(AtomicUsize::new(0));
        let workers = self.concurrency.min(ids.len());

        let mut join_set = JoinSet::new();
        for _ in 0..workers {
            let ids = Arc::clone(&ids);
            let cursor = Arc::clone(&cursor);
            let source = Arc::clone(&self.source);
            let policy = self.policy.clone();
            let timeout = self.fetch_timeout;
            let max_body = self.max_body_length;

            join_set.spawn(async move {
                let mut done: Vec<(usize, EmailRecord)> = Vec::new();
                loop {
                    let i = cursor.fetch_add(1, Ordering::Relaxed);
                    if i >= ids.len() {
                        break;
                    }
                    let id = &ids[i];
                    match fetch_one(&source, id, &policy, timeout).await {
                        Ok(raw) => done.push((i, normalize::normalize(&raw, max_body))),
                        Err(e) => log::warn!("skipping message {}: {}", id, e),
                    }
                }
                done
            });
        }

        // Slot results back into input order; a worker panic loses only
        // that worker's share of the batch.
        let mut slots: Vec<Option<EmailRecord>> = Vec::with_capacity(ids.len());
        slots.resize_with(ids.len(), || None);
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(pairs) => {
                    for (i, record) in pairs {
                        slots[i] = Some(record);
                    }
                }
                Err(e) => log::warn!("fetch worker failed: {}", e),
            }
        }

        slots.into_iter().flatten().collect()
    }
}

/// One message fetch with the full retry budget. A per-attempt timeout
/// counts as a failed (transient) attempt.
async fn fetch_one(
    source: &Arc<dyn MessageSource>,
    id: &MessageId,
    policy: &RetryPolicy,
    fetch_timeout: Duration,
) -> Result<RawMessage, SourceError> {
    retry(policy, &format!("fetch message {id}"), || {
        let source = Arc::clone(source);
        let id = id.clone();
        async move {
            match tokio::time::timeout(fetch_timeout, source.get_message(&id)).await {
                Ok(result) => result,
                Err(_) => Err(SourceError::Timeout(fetch_timeout.as_secs())),
            }
        }
    })
    .await
}
