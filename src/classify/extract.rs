//! Employer and role extraction from message content and sender address.
//!
//! Content-based employer extraction runs first over the *original-case*
//! text; the sender-domain fallback only applies when no content pattern
//! produces a valid candidate. All patterns are compiled once at
//! construction and the extractor is shared read-only across tasks.

use regex::Regex;

use super::keywords::{EMPLOYER_BLACKLIST, ROLE_TITLES, SKIP_DOMAINS};

/// Capitalized word run of up to three words, e.g. "Initech" or "Acme Data Labs".
const COMPANY_SHAPE: &str = r"([A-Z][a-zA-Z]+(?:\s+[A-Z][a-zA-Z]+){0,2})";

/// Default role when nothing more specific matches.
pub const DEFAULT_ROLE: &str = "Software Engineer";

pub struct EntityExtractor {
    employer_patterns: Vec<Regex>,
    role_patterns: Vec<(Regex, String)>,
    internship_pattern: Regex,
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityExtractor {
    pub fn new() -> Self {
        // Priority order: explicit "<noun> at Company" forms, then signature
        // blocks, then looser interest/applying forms.
        // Case-insensitive literals around a case-sensitive capitalized capture.
        let employer_templates = [
            format!(r"(?si:position.{{0,40}}?\bat\s+){COMPANY_SHAPE}"),
            format!(r"(?si:internship.{{0,40}}?\bat\s+){COMPANY_SHAPE}"),
            format!(r"(?si:role.{{0,40}}?\bat\s+){COMPANY_SHAPE}"),
            format!(r"(?si:job.{{0,40}}?\bat\s+){COMPANY_SHAPE}"),
            format!(r"{COMPANY_SHAPE}(?i:\s+recruiting\s+team)"),
            format!(r"{COMPANY_SHAPE}(?i:\s+team)"),
            format!(r"(?i:interest\s+in\s+){COMPANY_SHAPE}"),
            format!(
                r"(?si:thank\s+you\s+for\s+applying\s+to\s+.{{0,60}}?\bat\s+){COMPANY_SHAPE}"
            ),
            format!(r"(?i:best\s+regards,?\s*){COMPANY_SHAPE}(?i:\s+recruiting)"),
        ];
        let employer_patterns = employer_templates
            .iter()
            .map(|t| Regex::new(t).unwrap())
            .collect();

        let role_patterns = ROLE_TITLES
            .iter()
            .map(|title| {
                let re = Regex::new(&format!(r"\b{}\b", regex::escape(title))).unwrap();
                (re, title_case(title))
            })
            .collect();

        Self {
            employer_patterns,
            role_patterns,
            internship_pattern: Regex::new(r"\binternship\b").unwrap(),
        }
    }

    /// Extract the employer name, content first, sender domain as fallback.
    pub fn extract_employer(&self, subject: &str, body: &str, sender: &str) -> Option<String> {
        self.employer_from_content(subject, body)
            .or_else(|| employer_from_domain(sender))
    }

    /// Run the ordered pattern templates over the original-case text; the
    /// first valid candidate wins.
    pub fn employer_from_content(&self, subject: &str, body: &str) -> Option<String> {
        let text = format!("{subject} {body}");
        for pattern in &self.employer_patterns {
            for caps in pattern.captures_iter(&text) {
                if let Some(candidate) = caps.get(1) {
                    let candidate = candidate.as_str().trim();
                    if is_valid_employer(candidate) {
                        return Some(title_case(candidate));
                    }
                }
            }
        }
        None
    }

    /// Extract the role title from content. Total: falls back to
    /// "Internship" when only that word appears, then to the fixed default.
    pub fn extract_role(&self, subject: &str, body: &str) -> String {
        let text = format!("{subject} {body}").to_lowercase();
        for (pattern, title) in &self.role_patterns {
            if pattern.is_match(&text) {
                return title.clone();
            }
        }
        if self.internship_pattern.is_match(&text) {
            return "Internship".to_string();
        }
        DEFAULT_ROLE.to_string()
    }
}

/// A candidate is valid if 3–20 chars, not a blacklisted generic term, and
/// no single word of it is blacklisted (filters "Thank You", "Dear Candidate").
fn is_valid_employer(candidate: &str) -> bool {
    let len = candidate.len();
    if !(3..=20).contains(&len) {
        return false;
    }
    let lowered = candidate.to_lowercase();
    if EMPLOYER_BLACKLIST.contains(&lowered.as_str()) {
        return false;
    }
    !lowered
        .split_whitespace()
        .any(|word| EMPLOYER_BLACKLIST.contains(&word))
}

/// Derive an employer from the sender's email domain, skipping free-mail
/// and ATS-platform domains.
pub fn employer_from_domain(sender: &str) -> Option<String> {
    let address = bare_address(sender);
    let domain = address.rsplit_once('@')?.1.to_lowercase();
    if domain.is_empty() {
        return None;
    }
    if SKIP_DOMAINS.iter().any(|skip| domain.contains(skip)) {
        return None;
    }

    let label = domain.split('.').next().unwrap_or("");
    // Drop legal-entity suffixes glued onto the label ("initechinc").
    let label = ["corp", "inc", "llc", "ltd", "co"]
        .iter()
        .find_map(|suffix| label.strip_suffix(suffix))
        .unwrap_or(label);

    if label.len() < 3 || SKIP_DOMAINS.contains(&label) {
        return None;
    }
    Some(title_case(label))
}

/// Extract the bare address from a From header like `Name <a@b.com>`.
pub fn bare_address(from_field: &str) -> String {
    if let (Some(start), Some(end)) = (from_field.find('<'), from_field.find('>')) {
        if end > start {
            return from_field[start + 1..end].trim().to_lowercase();
        }
    }
    from_field.trim().to_lowercase()
}

/// Uppercase the first letter of each whitespace-separated word.
fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employer_from_internship_at_pattern() {
        let ex = EntityExtractor::new();
        let employer = ex.employer_from_content(
            "Re: Your Application",
            "Thank you for applying to the Data Analyst internship at Initech.",
        );
        assert_eq!(employer.as_deref(), Some("Initech"));
    }

    #[test]
    fn test_content_match_beats_domain_fallback() {
        let ex = EntityExtractor::new();
        let employer = ex.extract_employer(
            "Your application",
            "Thank you for applying to the Data Analyst internship at Initech.",
            "noreply@greenhouse.io",
        );
        assert_eq!(employer.as_deref(), Some("Initech"));
    }

    #[test]
    fn test_employer_from_signature_block() {
        let ex = EntityExtractor::new();
        let employer = ex.employer_from_content(
            "Update on your application",
            "We appreciate your patience.\n\nSincerely,\nAcme Recruiting Team",
        );
        assert_eq!(employer.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_employer_rejects_generic_terms() {
        let ex = EntityExtractor::new();
        // "Recruiting Team" alone should not produce a candidate.
        let employer =
            ex.employer_from_content("Interview", "Please contact the Recruiting Team directly.");
        assert_eq!(employer, None);
    }

    #[test]
    fn test_employer_absent_when_no_signal() {
        let ex = EntityExtractor::new();
        assert_eq!(ex.employer_from_content("hi", "see you tomorrow"), None);
    }

    #[test]
    fn test_domain_fallback_company_domain() {
        assert_eq!(
            employer_from_domain("HR <careers@initech.com>"),
            Some("Initech".to_string())
        );
    }

    #[test]
    fn test_domain_fallback_skips_freemail_and_ats() {
        assert_eq!(employer_from_domain("someone@gmail.com"), None);
        assert_eq!(employer_from_domain("noreply@greenhouse.io"), None);
        assert_eq!(employer_from_domain("jobs@myworkday.com"), None);
    }

    #[test]
    fn test_domain_fallback_strips_entity_suffix() {
        assert_eq!(
            employer_from_domain("hr@globexcorp.com"),
            Some("Globex".to_string())
        );
    }

    #[test]
    fn test_domain_fallback_rejects_short_label() {
        assert_eq!(employer_from_domain("a@io.io"), None);
    }

    #[test]
    fn test_bare_address() {
        assert_eq!(
            bare_address("Jane Doe <Jane@Initech.com>"),
            "jane@initech.com"
        );
        assert_eq!(bare_address("  HR@INITECH.COM "), "hr@initech.com");
    }

    #[test]
    fn test_role_extraction_priority() {
        let ex = EntityExtractor::new();
        assert_eq!(
            ex.extract_role("Offer", "your software engineering internship starts in June"),
            "Software Engineering Internship"
        );
        assert_eq!(
            ex.extract_role("Offer", "the data scientist position"),
            "Data Scientist"
        );
    }

    #[test]
    fn test_role_word_boundary() {
        let ex = EntityExtractor::new();
        // "node" inside another word must not match a role indicator phrase;
        // with no role present and no "internship", the fixed default wins.
        assert_eq!(
            ex.extract_role("Your application", "we reviewed it"),
            DEFAULT_ROLE
        );
    }

    #[test]
    fn test_role_internship_fallback() {
        let ex = EntityExtractor::new();
        assert_eq!(
            ex.extract_role("Summer internship at Acme", "details inside"),
            "Internship"
        );
    }
}
