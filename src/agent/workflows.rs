//! Interactive workflows.
//!
//! Two blocking dialog state machines: email composition+send and document
//! load+analyze. Each prompt/validation step retries until the input is
//! acceptable. The dialogs are driven through the [`Prompter`] seam so
//! tests can script them without a terminal.

use std::path::Path;

use regex::Regex;

use crate::inference::types::{ChatMessage, SamplingOverrides};
use crate::inference::ChatClient;
use crate::tools::document::{self, ExtractedDocument};
use crate::tools::email::{generate_draft, GeneratedDraft, MailTransport};

use super::errors::AgentError;
use super::orchestrator::{truncate_utf8, DOCUMENT_CONTEXT_BUDGET};
use super::session::{ActiveDocument, DocumentSession};

// ─── Prompter ────────────────────────────────────────────────────────────────

/// Input/output seam for the workflow dialogs.
///
/// The terminal implementation lives in the REPL; tests use a scripted
/// implementation. Keeping the dialog logic free of real I/O is what makes
/// the retry loops deterministic to test.
pub trait Prompter {
    /// Show `prompt` and read one line of input.
    fn read_line(&mut self, prompt: &str) -> Result<String, AgentError>;

    /// Display an informational line (progress, drafts, warnings).
    fn say(&mut self, message: &str);
}

// ─── Input parsing helpers ───────────────────────────────────────────────────

/// Standard email-address shape: local@domain.tld.
const EMAIL_ADDRESS_PATTERN: &str = r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$";

/// Recognize a yes/no answer. Returns `None` for anything else.
pub(crate) fn parse_yes_no(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "yes" | "y" => Some(true),
        "no" | "n" => Some(false),
        _ => None,
    }
}

/// Normalize a pasted document path: trim whitespace and surrounding quotes
/// ("Copy as Path" on most platforms wraps the path in double quotes).
pub(crate) fn normalize_path_input(input: &str) -> String {
    input.trim().trim_matches('"').to_string()
}

/// Split a comma-separated recipient list into (valid, invalid) addresses.
pub(crate) fn split_recipients(input: &str, pattern: &Regex) -> (Vec<String>, Vec<String>) {
    let mut valid = Vec::new();
    let mut invalid = Vec::new();

    for part in input.split(',') {
        let address = part.trim();
        if address.is_empty() {
            continue;
        }
        if pattern.is_match(address) {
            valid.push(address.to_string());
        } else {
            invalid.push(address.to_string());
        }
    }

    (valid, invalid)
}

// ─── Email workflow ──────────────────────────────────────────────────────────

/// The email dialog: collect a recipient name, generate a draft, present
/// it, confirm, collect validated addresses, send.
pub struct EmailWorkflow<'a> {
    chat: &'a ChatClient,
    mailer: &'a dyn MailTransport,
    sender_name: &'a str,
}

impl<'a> EmailWorkflow<'a> {
    pub fn new(
        chat: &'a ChatClient,
        mailer: &'a dyn MailTransport,
        sender_name: &'a str,
    ) -> Self {
        Self {
            chat,
            mailer,
            sender_name,
        }
    }

    /// Run the full dialog. The original query is the email topic.
    pub async fn run(
        &self,
        prompter: &mut dyn Prompter,
        topic: &str,
    ) -> Result<String, AgentError> {
        let recipient_name = collect_recipient_name(prompter)?;

        prompter.say(&format!("Generating email for {recipient_name}..."));
        let draft = generate_draft(
            self.chat,
            topic,
            &recipient_name,
            "professional",
            self.sender_name,
        )
        .await
        .map_err(|e| AgentError::DraftGeneration {
            reason: e.to_string(),
        })?;

        self.present_and_send(prompter, &recipient_name, &draft)
    }

    /// Present the draft, confirm, collect addresses, and deliver.
    ///
    /// Separated from [`run`] so the post-generation half of the dialog is
    /// testable without a model endpoint.
    pub fn present_and_send(
        &self,
        prompter: &mut dyn Prompter,
        recipient_name: &str,
        draft: &GeneratedDraft,
    ) -> Result<String, AgentError> {
        prompter.say("\nGenerated Email:");
        prompter.say(&format!("To: {recipient_name}"));
        prompter.say(&format!("Subject: {}", draft.subject));
        prompter.say("Body:");
        prompter.say(&"=".repeat(60));
        prompter.say(&draft.body);
        prompter.say(&"=".repeat(60));

        // Confirm — retry until a recognized yes/no token
        let send = loop {
            let answer = prompter.read_line("Would you like to send this email? (yes/no): ")?;
            match parse_yes_no(&answer) {
                Some(choice) => break choice,
                None => prompter.say("Please answer 'yes' or 'no'"),
            }
        };

        if !send {
            return Ok("Email draft saved. Not sent.".to_string());
        }

        let recipients = collect_recipients(prompter, recipient_name)?;

        prompter.say(&format!("Sending email to {recipient_name}..."));
        let outcome = self.mailer.send(&draft.subject, &draft.body, &recipients);

        tracing::info!(success = outcome.success, "email workflow finished");
        Ok(outcome.message)
    }
}

/// Retry until a non-empty recipient name is entered.
fn collect_recipient_name(prompter: &mut dyn Prompter) -> Result<String, AgentError> {
    loop {
        let name = prompter.read_line("Enter the recipient's name: ")?;
        let name = name.trim().to_string();
        if !name.is_empty() {
            return Ok(name);
        }
        prompter.say("Please enter a recipient name");
    }
}

/// Retry until at least one address validates. Invalid addresses are
/// dropped with a per-address warning.
fn collect_recipients(
    prompter: &mut dyn Prompter,
    recipient_name: &str,
) -> Result<Vec<String>, AgentError> {
    let pattern =
        Regex::new(EMAIL_ADDRESS_PATTERN).expect("hard-coded address pattern must compile");

    loop {
        let input = prompter.read_line(&format!(
            "Enter {recipient_name}'s email address(es) (separate multiple emails with commas): "
        ))?;

        if input.trim().is_empty() {
            prompter.say("Please enter at least one email address");
            continue;
        }

        let (valid, invalid) = split_recipients(&input, &pattern);
        for address in &invalid {
            prompter.say(&format!("Invalid email format: {address}"));
        }

        if !valid.is_empty() {
            return Ok(valid);
        }
        prompter.say("No valid email addresses provided. Please try again.");
    }
}

// ─── Document workflow ───────────────────────────────────────────────────────

const ANALYSIS_SYSTEM_PROMPT: &str = "\
You are a document analysis expert. Analyze the provided document content and \
provide a comprehensive summary including:

1. Document Type & Purpose
2. Main Topics/Themes
3. Key Points and Findings
4. Structure and Organization
5. Important Details or Data
6. Overall Summary

Be thorough but concise. Focus on the most important aspects of the document.";

/// The document dialog: collect a path, read, analyze, commit to the session.
pub struct DocumentWorkflow<'a> {
    chat: &'a ChatClient,
}

impl<'a> DocumentWorkflow<'a> {
    pub fn new(chat: &'a ChatClient) -> Self {
        Self { chat }
    }

    /// Run the full dialog. On success the session holds the new document
    /// and the returned string carries the confirmation plus the summary.
    pub async fn run(
        &self,
        prompter: &mut dyn Prompter,
        session: &mut DocumentSession,
    ) -> Result<String, AgentError> {
        let input = prompter.read_line("Enter the full path to your document: ")?;
        let path = normalize_path_input(&input);

        prompter.say("Reading document...");
        let extracted = document::read_document(Path::new(&path))?;

        if extracted.content.trim().is_empty() {
            return Err(AgentError::EmptyDocument);
        }

        prompter.say(&format!("Analyzing document '{}'...", extracted.name));
        let summary = self.analyze(&extracted).await?;

        let name = extracted.name.clone();
        session.open(ActiveDocument {
            name: name.clone(),
            content: extracted.content,
            summary: summary.clone(),
        });

        prompter.say(&format!("\nDocument Analysis for '{name}':"));
        prompter.say(&"=".repeat(80));
        prompter.say(&summary);
        prompter.say(&"=".repeat(80));
        prompter.say("You can now ask questions about this document!");
        prompter.say("Type 'close document' when you're done.");

        Ok(format!("Document '{name}' loaded and analyzed successfully!"))
    }

    /// One model call producing the structured multi-point summary.
    async fn analyze(&self, document: &ExtractedDocument) -> Result<String, AgentError> {
        let user_message = format!(
            "Analyze this document titled '{}':\n\n{}",
            document.name,
            truncate_utf8(&document.content, DOCUMENT_CONTEXT_BUDGET)
        );

        let messages = vec![
            ChatMessage::system(ANALYSIS_SYSTEM_PROMPT),
            ChatMessage::user(user_message),
        ];

        let completion = self
            .chat
            .chat_completion(messages, None, Some(SamplingOverrides::temperature(0.3)))
            .await?;

        Ok(completion.text().to_string())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::tools::email::SendOutcome;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Scripted prompter: pops pre-baked answers, records everything shown.
    struct ScriptedPrompter {
        answers: VecDeque<String>,
        shown: Vec<String>,
    }

    impl ScriptedPrompter {
        fn new(answers: &[&str]) -> Self {
            Self {
                answers: answers.iter().map(|s| s.to_string()).collect(),
                shown: Vec::new(),
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn read_line(&mut self, _prompt: &str) -> Result<String, AgentError> {
            self.answers.pop_front().ok_or(AgentError::InputClosed)
        }

        fn say(&mut self, message: &str) {
            self.shown.push(message.to_string());
        }
    }

    /// Mail transport that records calls instead of touching the network.
    struct RecordingMailer {
        calls: RefCell<Vec<(String, String, Vec<String>)>>,
    }

    impl RecordingMailer {
        fn new() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl MailTransport for RecordingMailer {
        fn send(&self, subject: &str, body: &str, recipients: &[String]) -> SendOutcome {
            self.calls.borrow_mut().push((
                subject.to_string(),
                body.to_string(),
                recipients.to_vec(),
            ));
            SendOutcome {
                success: true,
                message: format!(
                    "Email sent successfully to {} recipient(s): {}",
                    recipients.len(),
                    recipients.join(", ")
                ),
            }
        }
    }

    fn test_chat_client() -> ChatClient {
        // Points at a closed port; tests below never actually call it
        ChatClient::new(ModelConfig {
            base_url: "http://localhost:9".to_string(),
            api_key: None,
            model_name: "test".to_string(),
            temperature: 0.7,
            max_tokens: 256,
        })
        .unwrap()
    }

    fn sample_draft() -> GeneratedDraft {
        GeneratedDraft {
            subject: "Quarterly Report".to_string(),
            body: "Dear Dana,\n\nNumbers attached.\n\nBest regards,\nAlex".to_string(),
        }
    }

    // ── parsing helpers ─────────────────────────────────────────────────

    #[test]
    fn test_parse_yes_no_tokens() {
        assert_eq!(parse_yes_no("yes"), Some(true));
        assert_eq!(parse_yes_no("Y"), Some(true));
        assert_eq!(parse_yes_no(" no "), Some(false));
        assert_eq!(parse_yes_no("N"), Some(false));
        assert_eq!(parse_yes_no("maybe"), None);
        assert_eq!(parse_yes_no(""), None);
    }

    #[test]
    fn test_split_recipients_validation() {
        let pattern = Regex::new(EMAIL_ADDRESS_PATTERN).unwrap();
        let (valid, invalid) =
            split_recipients("dana@example.com, not-an-address, b@c.org", &pattern);
        assert_eq!(valid, vec!["dana@example.com", "b@c.org"]);
        assert_eq!(invalid, vec!["not-an-address"]);
    }

    #[test]
    fn test_address_pattern_rejects_malformed() {
        let pattern = Regex::new(EMAIL_ADDRESS_PATTERN).unwrap();
        for bad in ["plain", "a@b", "a@b.", "@b.com", "a b@c.com", "a@b.c"] {
            assert!(!pattern.is_match(bad), "{bad:?} should be rejected");
        }
        for good in ["a@b.co", "first.last+tag@sub.domain.org"] {
            assert!(pattern.is_match(good), "{good:?} should be accepted");
        }
    }

    // ── email dialog ────────────────────────────────────────────────────

    #[test]
    fn test_declining_send_keeps_draft_and_skips_smtp() {
        let chat = test_chat_client();
        let mailer = RecordingMailer::new();
        let workflow = EmailWorkflow::new(&chat, &mailer, "Alex");
        let mut prompter = ScriptedPrompter::new(&["no"]);

        let result = workflow
            .present_and_send(&mut prompter, "Dana", &sample_draft())
            .unwrap();

        assert_eq!(result, "Email draft saved. Not sent.");
        assert_eq!(mailer.call_count(), 0, "SMTP must not be touched");
    }

    #[test]
    fn test_confirm_retries_until_recognized_token() {
        let chat = test_chat_client();
        let mailer = RecordingMailer::new();
        let workflow = EmailWorkflow::new(&chat, &mailer, "Alex");
        let mut prompter = ScriptedPrompter::new(&["perhaps", "nope?", "no"]);

        let result = workflow
            .present_and_send(&mut prompter, "Dana", &sample_draft())
            .unwrap();

        assert_eq!(result, "Email draft saved. Not sent.");
        let nags = prompter
            .shown
            .iter()
            .filter(|m| m.contains("Please answer"))
            .count();
        assert_eq!(nags, 2);
    }

    #[test]
    fn test_send_path_validates_and_delivers() {
        let chat = test_chat_client();
        let mailer = RecordingMailer::new();
        let workflow = EmailWorkflow::new(&chat, &mailer, "Alex");
        let mut prompter =
            ScriptedPrompter::new(&["yes", "dana@example.com, broken-address, d2@example.org"]);

        let result = workflow
            .present_and_send(&mut prompter, "Dana", &sample_draft())
            .unwrap();

        assert!(result.contains("2 recipient(s)"));
        assert_eq!(mailer.call_count(), 1);
        let calls = mailer.calls.borrow();
        let (subject, _, recipients) = &calls[0];
        assert_eq!(subject, "Quarterly Report");
        assert_eq!(recipients.len(), 2, "invalid address must be dropped");
        assert!(prompter
            .shown
            .iter()
            .any(|m| m.contains("Invalid email format: broken-address")));
    }

    #[test]
    fn test_recipients_retry_when_all_invalid() {
        let chat = test_chat_client();
        let mailer = RecordingMailer::new();
        let workflow = EmailWorkflow::new(&chat, &mailer, "Alex");
        let mut prompter = ScriptedPrompter::new(&["yes", "nope, also-nope", "dana@example.com"]);

        let result = workflow
            .present_and_send(&mut prompter, "Dana", &sample_draft())
            .unwrap();

        assert!(result.contains("dana@example.com"));
        assert!(prompter
            .shown
            .iter()
            .any(|m| m.contains("No valid email addresses provided")));
    }

    #[test]
    fn test_recipient_name_retries_until_non_empty() {
        let mut prompter = ScriptedPrompter::new(&["", "  ", "Dana"]);
        let name = collect_recipient_name(&mut prompter).unwrap();
        assert_eq!(name, "Dana");
        assert_eq!(
            prompter
                .shown
                .iter()
                .filter(|m| m.contains("Please enter a recipient name"))
                .count(),
            2
        );
    }

    #[test]
    fn test_exhausted_input_surfaces_input_closed() {
        let mut prompter = ScriptedPrompter::new(&[]);
        let err = collect_recipient_name(&mut prompter).unwrap_err();
        assert!(matches!(err, AgentError::InputClosed));
    }

    // ── document dialog ─────────────────────────────────────────────────

    #[tokio::test]
    async fn test_empty_document_terminates_before_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "   \n  \n").unwrap();

        let chat = test_chat_client();
        let workflow = DocumentWorkflow::new(&chat);
        let mut session = DocumentSession::new();
        let path_answer = path.display().to_string();
        let mut prompter = ScriptedPrompter::new(&[path_answer.as_str()]);

        let err = workflow.run(&mut prompter, &mut session).await.unwrap_err();

        assert!(matches!(err, AgentError::EmptyDocument));
        assert!(!session.is_active(), "session must stay inactive");
    }

    #[tokio::test]
    async fn test_missing_document_terminates_with_read_error() {
        let chat = test_chat_client();
        let workflow = DocumentWorkflow::new(&chat);
        let mut session = DocumentSession::new();
        let mut prompter = ScriptedPrompter::new(&["/no/such/file.txt"]);

        let err = workflow.run(&mut prompter, &mut session).await.unwrap_err();

        assert!(err.to_string().contains("file not found"));
        assert!(!session.is_active());
    }

    #[tokio::test]
    async fn test_legacy_doc_rejected_before_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memo.doc");
        std::fs::write(&path, b"old word format").unwrap();

        let chat = test_chat_client();
        let workflow = DocumentWorkflow::new(&chat);
        let mut session = DocumentSession::new();
        let path_answer = path.display().to_string();
        let mut prompter = ScriptedPrompter::new(&[path_answer.as_str()]);

        let err = workflow.run(&mut prompter, &mut session).await.unwrap_err();

        assert!(err.to_string().contains("not supported"));
        assert!(!session.is_active());
    }

    #[test]
    fn test_quoted_path_is_unwrapped() {
        assert_eq!(
            normalize_path_input("  \"/tmp/some file.txt\"  "),
            "/tmp/some file.txt"
        );
        assert_eq!(normalize_path_input("/plain/path.pdf"), "/plain/path.pdf");
    }
}
