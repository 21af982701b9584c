//! Evidence-scoring classifier: the statistical-scorer seam.
//!
//! Scores admission and stage over the same phrase tables the rule
//! classifier uses, gated by confidence thresholds so false positives stay
//! bounded. Deterministic: scores are phrase-hit counts, not model
//! inference, but the contract (thresholded confidence over a fixed label
//! set) is the one a zero-shot model would plug into.

use crate::model::{Classification, EmailRecord, Stage};
use crate::normalize::parse_message_date;

use super::keywords::{
    contains_any, count_matches, APPLICATION_INDICATORS, INTERVIEW_PHRASES, OFFER_PHRASES,
    OUTREACH_EXCLUSIONS, REJECTION_PHRASES, ROLE_INDICATORS,
};
use super::rules::{classify_stage, prefilter};
use super::{extract::EntityExtractor, Classifier};

/// Minimum confidence to admit a message as an application response.
pub const ADMISSION_THRESHOLD: f64 = 0.6;

/// Minimum confidence to accept a stage directly from its score.
pub const STAGE_THRESHOLD: f64 = 0.7;

pub struct ScoredClassifier {
    extractor: EntityExtractor,
}

impl Default for ScoredClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoredClassifier {
    pub fn new() -> Self {
        Self {
            extractor: EntityExtractor::new(),
        }
    }

    /// Admission confidence in [0, 1]: application-response evidence plus
    /// role evidence plus provenance, with outreach phrasing as a hard
    /// penalty.
    pub fn admission_score(&self, subject: &str, body: &str, sender: &str) -> f64 {
        let text = format!("{subject} {body}").to_lowercase();

        if contains_any(&text, OUTREACH_EXCLUSIONS) {
            return 0.0;
        }

        let app_hits = count_matches(&text, APPLICATION_INDICATORS).min(3) as f64;
        let role_hits = count_matches(&text, ROLE_INDICATORS).min(2) as f64;
        let provenance = self.extractor.employer_from_content(subject, body).is_some()
            || super::extract::employer_from_domain(sender).is_some();

        let mut score = (app_hits / 3.0) * 0.5 + (role_hits / 2.0) * 0.3;
        if provenance {
            score += 0.2;
        }
        score
    }

    /// Stage confidence from phrase-hit density.
    fn stage_score(text: &str, table: &[&str]) -> f64 {
        count_matches(text, table).min(3) as f64 / 3.0
    }

    /// Pick the stage: first label (in the fixed priority order) whose score
    /// clears the threshold; otherwise fall back to the rule decision list.
    pub fn score_stage(subject: &str, body: &str) -> Stage {
        let text = format!("{subject} {body}").to_lowercase();
        let candidates = [
            (Stage::Interviewing, INTERVIEW_PHRASES),
            (Stage::Rejected, REJECTION_PHRASES),
            (Stage::Offered, OFFER_PHRASES),
        ];
        for (stage, table) in candidates {
            if Self::stage_score(&text, table) >= STAGE_THRESHOLD {
                return stage;
            }
        }
        classify_stage(subject, body)
    }
}

impl Classifier for ScoredClassifier {
    fn classify(&self, email: &EmailRecord) -> Option<Classification> {
        if !prefilter(&email.subject, &email.body) {
            return None;
        }
        if self.admission_score(&email.subject, &email.body, &email.sender) < ADMISSION_THRESHOLD {
            return None;
        }

        let employer = self
            .extractor
            .extract_employer(&email.subject, &email.body, &email.sender)?;
        let role = self.extractor.extract_role(&email.subject, &email.body);
        let stage = Self::score_stage(&email.subject, &email.body);

        Some(Classification {
            employer,
            role,
            stage,
            applied_at: parse_message_date(&email.date),
        })
    }
}
