//! Ordered intent classification.
//!
//! Queries are matched against one data-driven priority table of
//! case-insensitive regex sets. The first matching category wins; overlaps
//! ("find the document about weather") are resolved purely by table order,
//! never by scoring. Document follow-up is positional: an active document
//! plus no tool-category match.

use regex::{RegexSet, RegexSetBuilder};

// ─── Intent ──────────────────────────────────────────────────────────────────

/// The single category a query is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Close the active document session.
    CloseDocument,
    /// Question answered from the active document's stored content.
    DocumentFollowUp,
    /// Load/analyze a document (starts the document workflow).
    DocumentQuery,
    /// Compose and optionally send an email (starts the email workflow).
    EmailRequest,
    /// Weather lookup via the weather tool.
    WeatherRequest,
    /// File/folder search via the search tool.
    SearchRequest,
    /// Anything else — plain single-shot chat.
    GenericChat,
}

// ─── Pattern Table ───────────────────────────────────────────────────────────

const CLOSE_PATTERNS: &[&str] = &[
    r"close.*document",
    r"stop.*document",
    r"exit.*document",
    r"close.*file",
    r"stop.*analyzing",
    r"end.*document.*session",
];

const DOCUMENT_PATTERNS: &[&str] = &[
    r"tell.*about.*document",
    r"analyze.*document",
    r"read.*document",
    r"summarize.*document",
    r"what.*is.*in.*document",
    r"document.*analysis",
    r"open.*document",
    r"load.*document",
    r"analyze.*file",
    r"tell.*about.*file",
    r"summarize.*file",
    r"what.*is.*this.*document",
];

const EMAIL_PATTERNS: &[&str] = &[
    r"write.*email",
    r"compose.*email",
    r"draft.*email",
    r"create.*email",
    r"write.*mail",
    r"compose.*mail",
    r"draft.*mail",
    r"create.*mail",
    r"send.*email",
    r"send.*mail",
    r"email.*about",
    r"mail.*about",
    r"shoot.*email",
    r"shoot.*mail",
    r"fire.*email",
    r"fire.*mail",
    r"prepare.*email",
    r"prepare.*mail",
    r"make.*email",
    r"make.*mail",
    r"generate.*email",
    r"generate.*mail",
];

const WEATHER_PATTERNS: &[&str] = &[
    r"weather.*in",
    r"temperature.*in",
    r"how.*hot.*in",
    r"how.*cold.*in",
    r"what.*weather.*like.*in",
    r"weather.*forecast.*in",
    r"weather.*of",
    r"temperature.*of",
    r"climate.*in",
];

const SEARCH_PATTERNS: &[&str] = &[
    r"find.*file",
    r"locate.*file",
    r"search.*file",
    r"where.*file",
    r"find.*folder",
    r"locate.*folder",
    r"search.*folder",
    r"where.*folder",
    r"find.*\.([a-z0-9]+)",
    r"locate.*\.([a-z0-9]+)",
];

// ─── Classifier ──────────────────────────────────────────────────────────────

/// One category in the priority table.
struct CategoryRule {
    intent: Intent,
    patterns: RegexSet,
}

/// Ordered, data-driven intent classifier.
///
/// `classify` is a pure function of `(query, document_active)` — compiled
/// once at startup, no further state.
pub struct IntentClassifier {
    close: RegexSet,
    /// Tool categories in priority order: document, email, weather, search.
    tool_rules: Vec<CategoryRule>,
}

impl IntentClassifier {
    pub fn new() -> Self {
        Self {
            close: compile(CLOSE_PATTERNS),
            tool_rules: vec![
                CategoryRule {
                    intent: Intent::DocumentQuery,
                    patterns: compile(DOCUMENT_PATTERNS),
                },
                CategoryRule {
                    intent: Intent::EmailRequest,
                    patterns: compile(EMAIL_PATTERNS),
                },
                CategoryRule {
                    intent: Intent::WeatherRequest,
                    patterns: compile(WEATHER_PATTERNS),
                },
                CategoryRule {
                    intent: Intent::SearchRequest,
                    patterns: compile(SEARCH_PATTERNS),
                },
            ],
        }
    }

    /// Classify a query given whether a document session is active.
    ///
    /// Evaluation order (first match wins):
    /// 1. `CloseDocument`
    /// 2. `DocumentFollowUp` — active document and no tool category matches
    /// 3. `DocumentQuery`, 4. `EmailRequest`, 5. `WeatherRequest`,
    /// 6. `SearchRequest` — table order
    /// 7. `GenericChat`
    pub fn classify(&self, query: &str, document_active: bool) -> Intent {
        if self.close.is_match(query) {
            return Intent::CloseDocument;
        }

        let first_tool_match = self
            .tool_rules
            .iter()
            .find(|rule| rule.patterns.is_match(query))
            .map(|rule| rule.intent);

        if document_active && first_tool_match.is_none() {
            return Intent::DocumentFollowUp;
        }

        first_tool_match.unwrap_or(Intent::GenericChat)
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn compile(patterns: &[&str]) -> RegexSet {
    RegexSetBuilder::new(patterns)
        .case_insensitive(true)
        .build()
        .expect("hard-coded intent patterns must compile")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
