//! Sync configuration with environment overrides.
//!
//! Every knob has a documented default; `JOBTRAIL_*` environment variables
//! override individual settings without a config file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which classifier implementation drives admission and stage decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// Deterministic keyword-table procedure.
    Rules,
    /// Evidence-scoring variant with confidence thresholds.
    Scored,
}

/// Configuration for one sync pipeline instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    /// Mailbox search query used when listing candidate messages.
    pub search_query: String,
    /// Maximum messages considered per sync.
    pub max_results: u32,
    /// Per-message fetch worker pool size.
    pub concurrency: usize,
    /// Per-fetch timeout in seconds. A timed-out fetch consumes one retry attempt.
    pub fetch_timeout_secs: u64,
    /// Decoded body truncation length, in characters.
    pub max_body_length: usize,
    /// Retry attempt budget for transient fetch failures.
    pub max_retries: u32,
    /// Base retry delay in milliseconds.
    pub retry_delay_base_ms: u64,
    /// Exponential backoff (`base * 2^attempt`) when true, fixed delay otherwise.
    pub exponential_backoff: bool,
    /// Classifier selection.
    pub classifier: ClassifierKind,
    /// Classification cache capacity (entries). Zero disables the cache.
    pub cache_size: usize,
    /// SQLite database location.
    pub db_path: PathBuf,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            search_query: "subject:(application OR interview OR internship OR position \
                           OR job OR offer OR hired OR rejected)"
                .to_string(),
            max_results: 100,
            concurrency: 5,
            fetch_timeout_secs: 15,
            max_body_length: 1000,
            max_retries: 3,
            retry_delay_base_ms: 1000,
            exponential_backoff: true,
            classifier: ClassifierKind::Rules,
            cache_size: 1000,
            db_path: default_db_path(),
        }
    }
}

/// Default database location: `~/.jobtrail/jobtrail.db`.
fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".jobtrail")
        .join("jobtrail.db")
}

impl SyncConfig {
    /// Build a config from defaults, overridden by `JOBTRAIL_*` env vars.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(v) = std::env::var("JOBTRAIL_SEARCH_QUERY") {
            cfg.search_query = v;
        }
        if let Some(v) = env_parse("JOBTRAIL_MAX_RESULTS") {
            cfg.max_results = v;
        }
        if let Some(v) = env_parse("JOBTRAIL_CONCURRENCY") {
            cfg.concurrency = v;
        }
        if let Some(v) = env_parse("JOBTRAIL_FETCH_TIMEOUT_SECS") {
            cfg.fetch_timeout_secs = v;
        }
        if let Some(v) = env_parse("JOBTRAIL_MAX_BODY_LENGTH") {
            cfg.max_body_length = v;
        }
        if let Some(v) = env_parse("JOBTRAIL_MAX_RETRIES") {
            cfg.max_retries = v;
        }
        if let Some(v) = env_parse("JOBTRAIL_RETRY_DELAY_BASE_MS") {
            cfg.retry_delay_base_ms = v;
        }
        if let Ok(v) = std::env::var("JOBTRAIL_EXPONENTIAL_BACKOFF") {
            cfg.exponential_backoff = v.eq_ignore_ascii_case("true") || v == "1";
        }
        if let Ok(v) = std::env::var("JOBTRAIL_CLASSIFIER") {
            cfg.classifier = match v.to_lowercase().as_str() {
                "scored" => ClassifierKind::Scored,
                _ => ClassifierKind::Rules,
            };
        }
        if let Some(v) = env_parse("JOBTRAIL_CACHE_SIZE") {
            cfg.cache_size = v;
        }
        if let Ok(v) = std::env::var("JOBTRAIL_DB_PATH") {
            cfg.db_path = PathBuf::from(v);
        }
        cfg
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = SyncConfig::default();
        assert_eq!(cfg.max_results, 100);
        assert_eq!(cfg.concurrency, 5);
        assert_eq!(cfg.fetch_timeout_secs, 15);
        assert_eq!(cfg.max_body_length, 1000);
        assert_eq!(cfg.max_retries, 3);
        assert!(cfg.exponential_backoff);
        assert_eq!(cfg.classifier, ClassifierKind::Rules);
        assert!(cfg.search_query.contains("application"));
    }

    #[test]
    fn test_classifier_kind_serde() {
        let kind: ClassifierKind = serde_json::from_str("\"scored\"").unwrap();
        assert_eq!(kind, ClassifierKind::Scored);
    }
}
