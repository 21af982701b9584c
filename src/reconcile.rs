//! Reconciliation: merge a batch of classifications against the stored
//! record set, producing insert and update sets.
//!
//! The merge policy is monotonic — a record's stage never regresses except
//! via the rejection override — and idempotent, so overlapping batches and
//! repeated syncs are safe by construction.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::model::{Classification, JobRecord, RecordPatch, Stage};

/// Insert/update decision for one user's batch.
#[derive(Debug, Default, Clone)]
pub struct ReconcilePlan {
    pub inserts: Vec<JobRecord>,
    pub updates: Vec<RecordPatch>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty()
    }
}

/// Stage-merge policy: whether evidence of `new` should overwrite `current`.
///
/// Update when the new stage outranks the current one, when the new stage is
/// Rejected (a rejection is always informative, whatever came before), or on
/// the explicit Applied → Interviewing step the shared rank would hide.
pub fn should_update(current: Stage, new: Stage) -> bool {
    new.priority() > current.priority()
        || (new == Stage::Rejected && current != Stage::Rejected)
        || (new == Stage::Interviewing && current == Stage::Applied)
}

/// Build the reconcile plan for one batch.
///
/// Classifications are first folded per `(employer, role)` key so a batch
/// containing several messages for one application yields at most one
/// mutation per key — the business-key invariant holds within the batch,
/// not just against the store.
pub fn plan(user_id: &str, batch: &[Classification], existing: &[JobRecord]) -> ReconcilePlan {
    let index: HashMap<(String, String), &JobRecord> = existing
        .iter()
        .map(|r| ((r.employer.clone(), r.role.clone()), r))
        .collect();

    // Fold the batch: later evidence merges into earlier under the same policy.
    let mut folded: HashMap<(String, String), Classification> = HashMap::new();
    let mut key_order: Vec<(String, String)> = Vec::new();
    for c in batch {
        let key = (c.employer.clone(), c.role.clone());
        match folded.entry(key.clone()) {
            std::collections::hash_map::Entry::Vacant(slot) => {
                key_order.push(key);
                slot.insert(c.clone());
            }
            std::collections::hash_map::Entry::Occupied(mut slot) => {
                let held = slot.get_mut();
                if should_update(held.stage, c.stage) {
                    held.stage = c.stage;
                }
                held.applied_at = held.applied_at.max(c.applied_at);
            }
        }
    }

    let mut plan = ReconcilePlan::default();
    for key in key_order {
        let c = &folded[&key];
        match index.get(&key) {
            None => plan.inserts.push(JobRecord {
                id: Uuid::new_v4().to_string(),
                user_id: user_id.to_string(),
                employer: c.employer.clone(),
                role: c.role.clone(),
                stage: c.stage,
                applied_at: c.applied_at,
            }),
            Some(record) => {
                if should_update(record.stage, c.stage) {
                    plan.updates.push(RecordPatch {
                        id: record.id.clone(),
                        stage: c.stage,
                        // Most-recent-evidence wins, never regressed.
                        applied_at: merged_applied_at(record.applied_at, c.applied_at),
                    });
                } else {
                    log::debug!(
                        "no-op merge for ({}, {}): {} does not supersede {}",
                        c.employer,
                        c.role,
                        c.stage,
                        record.stage
                    );
                }
            }
        }
    }
    plan
}

fn merged_applied_at(current: DateTime<Utc>, new: DateTime<Utc>) -> DateTime<Utc> {
    current.max(new)
}
