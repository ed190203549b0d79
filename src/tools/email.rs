//! Email collaborators: draft generation via the model, delivery via SMTP.

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::SmtpConfig;
use crate::inference::types::{ChatMessage, SamplingOverrides};
use crate::inference::{ChatClient, InferenceError};

// ─── Draft Generation ────────────────────────────────────────────────────────

/// A generated email draft: subject line plus body with signature.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedDraft {
    pub subject: String,
    pub body: String,
}

fn email_writer_system_prompt(tone: &str, recipient_name: &str, sender_name: &str) -> String {
    let greeting_name = if recipient_name.is_empty() {
        "[Recipient Name]"
    } else {
        recipient_name
    };

    format!(
        "You are an expert email writer. Generate a well-structured email based on the \
         given topic.\n\n\
         Guidelines:\n\
         - Use a {tone} tone\n\
         - Create a clear and concise subject line (don't include \"Subject:\" prefix)\n\
         - Structure the email with proper greeting using the recipient's name, body, \
           and professional closing\n\
         - The sender is {sender_name}\n\
         - Include a proper email signature at the end\n\
         - Make it concise but comprehensive\n\
         - Return ONLY a JSON object with 'subject' and 'body' keys\n\
         - Do not include any markdown formatting or extra text outside the JSON\n\n\
         Email Structure:\n\
         - Greeting: Dear {greeting_name},\n\
         - Body: Well-structured content about the topic\n\
         - Closing: Best regards, / Sincerely,\n\
         - Signature: {sender_name}"
    )
}

/// Generate a `{subject, body}` draft about `topic` with one model call.
pub async fn generate_draft(
    chat: &ChatClient,
    topic: &str,
    recipient_name: &str,
    tone: &str,
    sender_name: &str,
) -> Result<GeneratedDraft, InferenceError> {
    let user_message = if recipient_name.is_empty() {
        format!("Write an email about: {topic}")
    } else {
        format!("Write an email about: {topic} to {recipient_name}")
    };

    let messages = vec![
        ChatMessage::system(email_writer_system_prompt(tone, recipient_name, sender_name)),
        ChatMessage::user(user_message),
    ];

    let completion = chat
        .chat_completion(messages, None, Some(SamplingOverrides::temperature(0.7)))
        .await?;

    Ok(parse_draft_response(completion.text(), sender_name))
}

/// Parse the model's draft response.
///
/// Primary path: a JSON object with `subject` and `body` keys (code fences
/// stripped first). Fallback for non-JSON output: a line beginning with
/// `subject:` splits the subject from the body; otherwise the whole text
/// becomes the body under a generic subject. The sender's signature is
/// appended whenever the model left it out.
pub fn parse_draft_response(text: &str, sender_name: &str) -> GeneratedDraft {
    let cleaned = strip_code_fences(text.trim());

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(cleaned) {
        let subject = value
            .get("subject")
            .and_then(|s| s.as_str())
            .unwrap_or("Email Subject")
            .to_string();
        let body = value
            .get("body")
            .and_then(|b| b.as_str())
            .unwrap_or("")
            .to_string();
        return GeneratedDraft {
            subject,
            body: ensure_signature(body, sender_name),
        };
    }

    // Fallback: extract subject and body manually
    let lines: Vec<&str> = cleaned.lines().collect();
    for (i, line) in lines.iter().enumerate() {
        if line.to_lowercase().starts_with("subject:") {
            let subject = line.splitn(2, ':').nth(1).unwrap_or("").trim().to_string();
            let body: String = lines[..i]
                .iter()
                .chain(lines[i + 1..].iter())
                .copied()
                .collect::<Vec<_>>()
                .join("\n");
            return GeneratedDraft {
                subject,
                body: ensure_signature(body, sender_name),
            };
        }
    }

    GeneratedDraft {
        subject: "Generated Email".to_string(),
        body: ensure_signature(cleaned.to_string(), sender_name),
    }
}

/// Strip a leading ```/```json fence and the matching trailing fence.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
    else {
        return trimmed;
    };
    rest.trim_end_matches("```").trim()
}

/// Append the sender's signature when the body does not already carry it.
fn ensure_signature(body: String, sender_name: &str) -> String {
    if body.contains(sender_name) {
        body
    } else {
        format!("{body}\n\nBest regards,\n{sender_name}")
    }
}

// ─── Delivery ────────────────────────────────────────────────────────────────

/// Result of one delivery attempt — success flag plus a message that can be
/// shown to the user verbatim.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub success: bool,
    pub message: String,
}

impl SendOutcome {
    fn failure(reason: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            message: format!("Failed to send email: {reason}"),
        }
    }
}

/// Delivery seam for the email workflow. The production implementation is
/// [`SmtpMailer`]; tests substitute a recorder.
pub trait MailTransport {
    fn send(&self, subject: &str, body: &str, recipients: &[String]) -> SendOutcome;
}

/// SMTP delivery over STARTTLS, authenticating once per send.
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }
}

impl MailTransport for SmtpMailer {
    fn send(&self, subject: &str, body: &str, recipients: &[String]) -> SendOutcome {
        let from: Mailbox = match format!(
            "{} <{}>",
            self.config.sender_name, self.config.sender_email
        )
        .parse()
        {
            Ok(mailbox) => mailbox,
            Err(e) => return SendOutcome::failure(format!("invalid sender address: {e}")),
        };

        let mut builder = Message::builder().from(from).subject(subject);
        for recipient in recipients {
            match recipient.parse::<Mailbox>() {
                Ok(mailbox) => builder = builder.to(mailbox),
                Err(e) => {
                    return SendOutcome::failure(format!(
                        "invalid recipient address '{recipient}': {e}"
                    ))
                }
            }
        }

        let message = match builder.body(body.to_string()) {
            Ok(message) => message,
            Err(e) => return SendOutcome::failure(format!("could not build message: {e}")),
        };

        let transport = match SmtpTransport::starttls_relay(&self.config.server) {
            Ok(relay) => relay
                .port(self.config.port)
                .credentials(Credentials::new(
                    self.config.sender_email.clone(),
                    self.config.sender_password.clone(),
                ))
                .build(),
            Err(e) => return SendOutcome::failure(format!("SMTP setup error: {e}")),
        };

        match transport.send(&message) {
            Ok(_) => {
                tracing::info!(recipients = recipients.len(), "email sent");
                SendOutcome {
                    success: true,
                    message: format!(
                        "Email sent successfully to {} recipient(s): {}",
                        recipients.len(),
                        recipients.join(", ")
                    ),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "SMTP send failed");
                SendOutcome::failure(e)
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
