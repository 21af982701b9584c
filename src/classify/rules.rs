//! Rule-based classification: admission filter, admission decision, and
//! stage decision as deterministic keyword procedures.

use crate::model::{Classification, EmailRecord, Stage};
use crate::normalize::parse_message_date;

use super::keywords::{
    contains_any, APPLICATION_INDICATORS, INTERVIEW_PHRASES, OFFER_PHRASES, OUTREACH_EXCLUSIONS,
    PREFILTER_REQUIRED, PREFILTER_SPAM, REJECTION_PHRASES, ROLE_INDICATORS,
};
use super::{extract::EntityExtractor, Classifier};

/// Cheap pre-screen eliminating obvious non-candidates before the full gate
/// sequence. Intentionally permissive: stricter rejection is the gates' job.
pub fn prefilter(subject: &str, body: &str) -> bool {
    let text = format!("{subject} {body}").to_lowercase();
    contains_any(&text, PREFILTER_REQUIRED) && !contains_any(&text, PREFILTER_SPAM)
}

/// Stage decision for a message that already passed admission.
///
/// Interview phrases are checked first: interview-scheduling emails often
/// contain incidental negative words that would trip the rejection table.
pub fn classify_stage(subject: &str, body: &str) -> Stage {
    let text = format!("{subject} {body}").to_lowercase();
    if contains_any(&text, INTERVIEW_PHRASES) {
        return Stage::Interviewing;
    }
    if contains_any(&text, REJECTION_PHRASES) {
        return Stage::Rejected;
    }
    if contains_any(&text, OFFER_PHRASES) {
        return Stage::Offered;
    }
    Stage::Applied
}

/// Deterministic keyword-table classifier.
pub struct RuleClassifier {
    extractor: EntityExtractor,
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleClassifier {
    pub fn new() -> Self {
        Self {
            extractor: EntityExtractor::new(),
        }
    }

    /// Admission decision: four sequential gates, cheapest first,
    /// short-circuiting on the first failure.
    pub fn is_application_response(&self, subject: &str, body: &str, sender: &str) -> bool {
        let text = format!("{subject} {body}").to_lowercase();

        // Gate 1: must carry a specific application-response phrase.
        if !contains_any(&text, APPLICATION_INDICATORS) {
            return false;
        }
        // Gate 2: must mention a role or technology.
        if !contains_any(&text, ROLE_INDICATORS) {
            return false;
        }
        // Gate 3: cold outreach and job-board noise are out.
        if contains_any(&text, OUTREACH_EXCLUSIONS) {
            return false;
        }
        // Gate 4: provenance — a content-extractable employer, or failing
        // that, a non-generic sender domain.
        self.extractor.employer_from_content(subject, body).is_some()
            || super::extract::employer_from_domain(sender).is_some()
    }
}

impl Classifier for RuleClassifier {
    fn classify(&self, email: &EmailRecord) -> Option<Classification> {
        if !prefilter(&email.subject, &email.body) {
            return None;
        }
        if !self.is_application_response(&email.subject, &email.body, &email.sender) {
            return None;
        }

        // Provenance gate guarantees at least the domain fallback here.
        let employer = self
            .extractor
            .extract_employer(&email.subject, &email.body, &email.sender)?;
        let role = self.extractor.extract_role(&email.subject, &email.body);
        let stage = classify_stage(&email.subject, &email.body);

        Some(Classification {
            employer,
            role,
            stage,
            applied_at: parse_message_date(&email.date),
        })
    }
}
