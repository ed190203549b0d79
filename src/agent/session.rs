//! Document session state.
//!
//! At most one document is active per process. Opening a new one replaces
//! the old one — no stacking, no merge. The session is owned by the router
//! and passed by reference; there are no ambient globals.

/// The currently loaded document and its pre-computed analysis.
#[derive(Debug, Clone)]
pub struct ActiveDocument {
    /// Basename of the loaded file, shown in the REPL status line.
    pub name: String,
    /// Extracted plain text, used verbatim for follow-up questions.
    pub content: String,
    /// The analysis produced when the document was loaded.
    pub summary: String,
}

/// Process-wide record of at most one open document.
#[derive(Debug, Default)]
pub struct DocumentSession {
    active: Option<ActiveDocument>,
}

impl DocumentSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a document is currently open.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// The active document, if any.
    pub fn active(&self) -> Option<&ActiveDocument> {
        self.active.as_ref()
    }

    /// Open a document, unconditionally replacing any previous one.
    pub fn open(&mut self, document: ActiveDocument) {
        tracing::info!(document = %document.name, "document session opened");
        self.active = Some(document);
    }

    /// Close the session. Returns the closed document's name, or `None`
    /// if no document was open.
    pub fn close(&mut self) -> Option<String> {
        let name = self.active.take().map(|d| d.name);
        if let Some(ref name) = name {
            tracing::info!(document = %name, "document session closed");
        }
        name
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str) -> ActiveDocument {
        ActiveDocument {
            name: name.to_string(),
            content: format!("content of {name}"),
            summary: format!("summary of {name}"),
        }
    }

    #[test]
    fn test_starts_inactive() {
        let session = DocumentSession::new();
        assert!(!session.is_active());
        assert!(session.active().is_none());
    }

    #[test]
    fn test_open_then_close_returns_name() {
        let mut session = DocumentSession::new();
        session.open(doc("report.pdf"));
        assert!(session.is_active());
        assert_eq!(session.active().unwrap().name, "report.pdf");

        assert_eq!(session.close(), Some("report.pdf".to_string()));
        assert!(!session.is_active());
    }

    #[test]
    fn test_close_without_document() {
        let mut session = DocumentSession::new();
        assert_eq!(session.close(), None);
        assert!(!session.is_active());
    }

    #[test]
    fn test_open_replaces_previous_document() {
        let mut session = DocumentSession::new();
        session.open(doc("first.txt"));
        session.open(doc("second.txt"));

        let active = session.active().unwrap();
        assert_eq!(active.name, "second.txt");
        assert_eq!(active.content, "content of second.txt");
        // Only one close is possible afterwards
        assert_eq!(session.close(), Some("second.txt".to_string()));
        assert_eq!(session.close(), None);
    }

    #[test]
    fn test_stored_content_round_trips() {
        let mut session = DocumentSession::new();
        session.open(ActiveDocument {
            name: "notes.txt".into(),
            content: "the exact bytes loaded at open time".into(),
            summary: "a summary".into(),
        });
        assert_eq!(
            session.active().unwrap().content,
            "the exact bytes loaded at open time"
        );
    }
}
