//! Phrase tables driving admission and stage decisions.
//!
//! These lists are the canonical policy: the decision code in `rules.rs`
//! and `scored.rs` is a generic any-substring predicate over them, so the
//! policy can be reviewed and tested independently of the control flow.
//! "unfortunately" lives only in the rejection table — it is never a
//! required positive indicator.

/// Cheap pre-screen: at least one of these must appear for a message to be
/// worth classifying at all.
pub const PREFILTER_REQUIRED: &[&str] = &[
    "application",
    "interview",
    "position",
    "role",
    "internship",
    "job",
    "candidate",
    "hiring",
    "recruitment",
];

/// Cheap pre-screen: any of these rejects outright as promotional noise.
pub const PREFILTER_SPAM: &[&str] = &[
    "unsubscribe",
    "newsletter",
    "promotion",
    "marketing",
    "click here",
    "limited time",
];

/// Phrases that mark a genuine response to an application the user sent.
pub const APPLICATION_INDICATORS: &[&str] = &[
    "your application for",
    "position you applied",
    "role you applied",
    "we received your application",
    "application status",
    "selected to move forward",
    "move forward in the recruitment",
    "invite you to interview",
    "invite you to an interview",
    "invite you to the next step",
    "would like to schedule an interview",
    "would like to discuss your application",
    "interview for the position",
    "next steps in the hiring process",
    "next step of our recruitment",
    "schedule a time to discuss",
    "interview with our team",
    "schedule a technical interview",
    "excited to offer",
    "pleased to offer",
    "happy to offer",
    "offer you the position",
    "job offer",
    "offer of employment",
    "confirm your acceptance",
    "welcoming you to the team",
    "thank you for applying to",
    "regret to inform",
    "we've reviewed your application",
];

/// Role/technology indicators filtering out non-technical recruitment noise.
pub const ROLE_INDICATORS: &[&str] = &[
    "software engineer",
    "developer",
    "data scientist",
    "machine learning",
    "artificial intelligence",
    "python",
    "java",
    "javascript",
    "react",
    "node",
    "backend",
    "frontend",
    "fullstack",
    "devops",
    "cloud",
    "aws",
    "azure",
    "database",
    "api",
    "web developer",
    "mobile developer",
    "internship",
    "technical role",
    "engineering role",
    "product manager",
    "ux designer",
    "data analyst",
    "research scientist",
];

/// Cold-outreach and job-board phrasing. Presence rejects the message.
pub const OUTREACH_EXCLUSIONS: &[&str] = &[
    "we found your resume",
    "came across your profile",
    "great opportunity for you",
    "thought you might be interested",
    "perfect fit for you",
    "share an opportunity",
    "new openings",
    "job opportunities",
    "career opportunities",
    "hiring now",
    "job alert",
    "featured jobs",
    "unsubscribe",
];

/// Interview-scheduling language. Checked before rejection/offer phrases:
/// it is the most specific and least likely to co-occur accidentally.
pub const INTERVIEW_PHRASES: &[&str] = &[
    "schedule an interview",
    "interview invitation",
    "invite you to interview",
    "next step is an interview",
    "interview for the position",
    "phone interview",
    "video interview",
    "technical interview",
    "selected to move forward",
    "discuss your application in an interview",
    "schedule a time to discuss",
    "interview with our team",
    "arrange a convenient time for an interview",
];

pub const REJECTION_PHRASES: &[&str] = &[
    "unfortunately",
    "regret to inform",
    "not selected",
    "not moving forward",
    "not the right fit",
    "other candidates",
    "will not be proceeding",
    "thank you for your interest, however",
    "different direction",
    "unsuccessful",
];

pub const OFFER_PHRASES: &[&str] = &[
    "pleased to offer",
    "excited to offer",
    "happy to offer",
    "offer you the position",
    "job offer",
    "offer of employment",
    "start date",
    "stipend",
    "salary",
    "welcome to the team",
    "congratulations",
    "accepted for the position",
    "we believe you would be a great addition",
    "confirm your acceptance",
    "signing the attached form",
    "welcoming you to the team",
];

/// Generic words a content-extracted employer candidate must not be.
pub const EMPLOYER_BLACKLIST: &[&str] = &[
    "thank", "you", "for", "your", "the", "and", "with", "from", "team",
    "recruiting", "we", "our", "this", "that", "next", "step", "process",
    "application", "position", "role", "internship", "job", "opportunity",
    "interview", "technical", "phone", "video", "online", "best", "regards",
    "sincerely", "yours", "kind", "looking", "forward", "please", "let",
    "know", "time", "schedule", "availability", "convenient", "offer", "of",
    "excited", "to", "pleased", "happy", "welcome", "addition", "great",
    "dear", "hello",
];

/// Free-mail providers and ATS/job-board platforms whose domains never name
/// the employer.
pub const SKIP_DOMAINS: &[&str] = &[
    "gmail",
    "yahoo",
    "outlook",
    "hotmail",
    "icloud",
    "aol",
    "mail",
    "recruiting",
    "staffing",
    "jobvite",
    "workday",
    "greenhouse",
    "lever",
    "bamboohr",
    "indeed",
    "linkedin",
    "glassdoor",
    "monster",
    "ziprecruiter",
    "careerbuilder",
    "dice",
    "talent.com",
];

/// Canonical role titles, in priority order. Word-boundary matched.
pub const ROLE_TITLES: &[&str] = &[
    "software engineering internship",
    "software engineer intern",
    "machine learning engineer",
    "software engineer",
    "data scientist",
    "frontend developer",
    "backend developer",
    "fullstack developer",
    "devops engineer",
    "cloud engineer",
    "web developer",
    "mobile developer",
    "product manager",
    "ux designer",
    "data analyst",
    "research scientist",
    "technical intern",
    "engineering intern",
    "developer intern",
];

/// True if any phrase in `table` occurs within `text`. Callers lower-case
/// `text` first; the tables are already lower-case.
pub fn contains_any(text: &str, table: &[&str]) -> bool {
    table.iter().any(|phrase| text.contains(phrase))
}

/// Count of distinct phrases from `table` occurring within `text`.
pub fn count_matches(text: &str, table: &[&str]) -> usize {
    table.iter().filter(|phrase| text.contains(*phrase)).count()
}
