//! Core domain types shared across the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Application lifecycle stage
// ============================================================================

/// Lifecycle stage of a job application, as inferred from message content.
///
/// Progress is not a linear order: a rejection can follow any stage. The
/// reconciler's merge policy encodes the allowed transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Applied,
    Interviewing,
    Offered,
    Rejected,
}

impl Stage {
    /// Numeric merge priority. Rejected deliberately shares Interviewing's
    /// rank — the rejection override in the reconciler lets it beat Offered.
    pub fn priority(self) -> u8 {
        match self {
            Stage::Applied => 1,
            Stage::Interviewing => 2,
            Stage::Rejected => 2,
            Stage::Offered => 3,
        }
    }

    /// Store representation, matching the serde rename.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Applied => "applied",
            Stage::Interviewing => "interviewing",
            Stage::Offered => "offered",
            Stage::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "applied" => Ok(Stage::Applied),
            "interviewing" => Ok(Stage::Interviewing),
            "offered" => Ok(Stage::Offered),
            "rejected" => Ok(Stage::Rejected),
            other => Err(format!("unknown stage: {other}")),
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Pipeline records
// ============================================================================

/// A normalized email, produced once per message fetch and consumed
/// synchronously by classification. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailRecord {
    pub subject: String,
    pub sender: String,
    /// Source-native timestamp string (typically RFC 2822 from the Date header).
    pub date: String,
    /// Plain-text body, already decoded and truncated.
    pub body: String,
}

/// Output of a successful classification: one candidate application event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub employer: String,
    pub role: String,
    pub stage: Stage,
    pub applied_at: DateTime<Utc>,
}

/// A persisted application record. At most one exists per
/// `(user_id, employer, role)` — the business key, enforced by the reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: String,
    pub user_id: String,
    pub employer: String,
    pub role: String,
    pub stage: Stage,
    pub applied_at: DateTime<Utc>,
}

/// Field-level update against an existing record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPatch {
    pub id: String,
    pub stage: Stage,
    pub applied_at: DateTime<Utc>,
}

/// Result of one `sync_user` invocation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    /// Number of messages that made it through fetch + normalization.
    pub processed: usize,
    /// Records inserted or updated by this sync.
    pub records: Vec<JobRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_stage_priority_ordering() {
        assert!(Stage::Interviewing.priority() > Stage::Applied.priority());
        assert!(Stage::Offered.priority() > Stage::Interviewing.priority());
        assert_eq!(Stage::Rejected.priority(), Stage::Interviewing.priority());
    }

    #[test]
    fn test_stage_str_roundtrip() {
        for stage in [
            Stage::Applied,
            Stage::Interviewing,
            Stage::Offered,
            Stage::Rejected,
        ] {
            assert_eq!(Stage::from_str(stage.as_str()).unwrap(), stage);
        }
    }

    #[test]
    fn test_stage_from_str_unknown() {
        assert!(Stage::from_str("ghosted").is_err());
    }

    #[test]
    fn test_stage_serde_lowercase() {
        let json = serde_json::to_string(&Stage::Interviewing).unwrap();
        assert_eq!(json, "\"interviewing\"");
        let back: Stage = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(back, Stage::Rejected);
    }
}
