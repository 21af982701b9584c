//! Email classification: admission filter, stage decision, and entity
//! extraction behind one `Classifier` contract.
//!
//! Two implementations share the same phrase tables: the deterministic
//! rule procedure (`rules`) and the evidence-scoring variant (`scored`).
//! Selection is a config value; callers never branch on the kind. The
//! classifier instance is built once at startup and shared read-only.

pub mod extract;
pub mod keywords;
pub mod rules;
pub mod scored;

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use sha2::{Digest, Sha256};

use crate::config::{ClassifierKind, SyncConfig};
use crate::model::{Classification, EmailRecord};

/// Admission and stage decision behind one contract. Total: absence of
/// signal is `None`, never an error.
pub trait Classifier: Send + Sync {
    fn classify(&self, email: &EmailRecord) -> Option<Classification>;
}

/// Build the configured classifier, wrapped in the read-through cache when
/// `cache_size` is non-zero.
pub fn build_classifier(config: &SyncConfig) -> Arc<dyn Classifier> {
    let inner: Arc<dyn Classifier> = match config.classifier {
        ClassifierKind::Rules => Arc::new(rules::RuleClassifier::new()),
        ClassifierKind::Scored => Arc::new(scored::ScoredClassifier::new()),
    };
    if config.cache_size == 0 {
        return inner;
    }
    Arc::new(CachedClassifier::new(inner, config.cache_size))
}

// ============================================================================
// Content-hash cache
// ============================================================================

struct CacheInner {
    map: HashMap<String, Option<Classification>>,
    order: VecDeque<String>,
}

/// Read-through cache keyed by a content hash. Inputs are immutable, so a
/// hit can never be stale; duplicate message content across syncs skips
/// recomputation.
pub struct CachedClassifier {
    inner: Arc<dyn Classifier>,
    capacity: usize,
    cache: Mutex<CacheInner>,
}

impl CachedClassifier {
    pub fn new(inner: Arc<dyn Classifier>, capacity: usize) -> Self {
        Self {
            inner,
            capacity: capacity.max(1),
            cache: Mutex::new(CacheInner {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    fn content_key(email: &EmailRecord) -> String {
        let mut hasher = Sha256::new();
        hasher.update(email.subject.as_bytes());
        hasher.update([0]);
        hasher.update(email.sender.as_bytes());
        hasher.update([0]);
        hasher.update(email.body.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl Classifier for CachedClassifier {
    fn classify(&self, email: &EmailRecord) -> Option<Classification> {
        let key = Self::content_key(email);

        match self.cache.lock() {
            Ok(cache) => {
                if let Some(hit) = cache.map.get(&key) {
                    return hit.clone();
                }
            }
            Err(_) => log::warn!("classification cache lock poisoned; bypassing cache"),
        }

        let result = self.inner.classify(email);

        if let Ok(mut cache) = self.cache.lock() {
            if !cache.map.contains_key(&key) {
                if cache.order.len() >= self.capacity {
                    if let Some(evicted) = cache.order.pop_front() {
                        cache.map.remove(&evicted);
                    }
                }
                cache.order.push_back(key.clone());
                cache.map.insert(key, result.clone());
            }
        }

        result
    }
}
