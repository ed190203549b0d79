//! Top-level query routing.
//!
//! One [`RouterAgent`] owns the classifier, the document session, the chat
//! client, and the tool dispatcher for the process lifetime. Every query is
//! fully processed — including all blocking prompts and network calls —
//! before the next one is accepted, so no locking is needed anywhere.

use crate::config::AppConfig;
use crate::inference::{ChatClient, InferenceError};
use crate::tools::email::SmtpMailer;
use crate::tools::ToolDispatcher;

use super::intent::{Intent, IntentClassifier};
use super::orchestrator::{
    run_chat_round, run_document_round, run_tool_round, GENERIC_SYSTEM_PROMPT,
    SEARCH_SYSTEM_PROMPT, WEATHER_SYSTEM_PROMPT,
};
use super::session::DocumentSession;
use super::workflows::{DocumentWorkflow, EmailWorkflow, Prompter};

/// The assistant's top-level decision function plus the state it conditions on.
pub struct RouterAgent {
    classifier: IntentClassifier,
    session: DocumentSession,
    chat: ChatClient,
    dispatcher: ToolDispatcher,
    mailer: SmtpMailer,
    sender_name: String,
}

impl RouterAgent {
    pub fn new(config: AppConfig) -> Result<Self, InferenceError> {
        let chat = ChatClient::new(config.model.clone())?;
        let dispatcher = ToolDispatcher::new(
            config.search.resolved_roots(),
            config.smtp.sender_name.clone(),
        );
        let sender_name = config.smtp.sender_name.clone();
        let mailer = SmtpMailer::new(config.smtp);

        tracing::info!(
            model = chat.model_name(),
            tools = ?dispatcher.registry().names(),
            "router ready"
        );

        Ok(Self {
            classifier: IntentClassifier::new(),
            session: DocumentSession::new(),
            chat,
            dispatcher,
            mailer,
            sender_name,
        })
    }

    /// The active document's name, shown by the REPL each turn.
    pub fn document_name(&self) -> Option<&str> {
        self.session.active().map(|d| d.name.as_str())
    }

    /// Route one query to a workflow, a tool round, or plain chat.
    ///
    /// Every error becomes a descriptive string here — nothing below this
    /// boundary crashes the REPL.
    pub async fn respond(&mut self, query: &str, prompter: &mut dyn Prompter) -> String {
        let intent = self.classifier.classify(query, self.session.is_active());
        tracing::info!(?intent, "query classified");

        match intent {
            Intent::CloseDocument => match self.session.close() {
                Some(name) => {
                    format!("Document '{name}' closed. Resuming normal operations.")
                }
                None => "No document is currently open.".to_string(),
            },

            Intent::DocumentFollowUp => {
                // is_active() was true for this intent to be selected
                let Some(document) = self.session.active() else {
                    return "No document is currently open.".to_string();
                };
                prompter.say(&format!("Answering from document: {}", document.name));
                run_document_round(&self.chat, document, query)
                    .await
                    .unwrap_or_else(|e| {
                        format!("Error processing question about document: {e}")
                    })
            }

            Intent::DocumentQuery => DocumentWorkflow::new(&self.chat)
                .run(prompter, &mut self.session)
                .await
                .unwrap_or_else(|e| format!("Error in document workflow: {e}")),

            Intent::EmailRequest => {
                EmailWorkflow::new(&self.chat, &self.mailer, &self.sender_name)
                    .run(prompter, query)
                    .await
                    .unwrap_or_else(|e| format!("Error in email workflow: {e}"))
            }

            Intent::WeatherRequest => {
                run_tool_round(&self.chat, &self.dispatcher, WEATHER_SYSTEM_PROMPT, query)
                    .await
                    .unwrap_or_else(|e| format!("Error getting response: {e}"))
            }

            Intent::SearchRequest => {
                run_tool_round(&self.chat, &self.dispatcher, SEARCH_SYSTEM_PROMPT, query)
                    .await
                    .unwrap_or_else(|e| format!("Error getting response: {e}"))
            }

            Intent::GenericChat => {
                run_chat_round(&self.chat, GENERIC_SYSTEM_PROMPT, query, None)
                    .await
                    .unwrap_or_else(|e| format!("Error getting response: {e}"))
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::errors::AgentError;
    use crate::config::{ModelConfig, SearchConfig, SmtpConfig};

    struct SilentPrompter;

    impl Prompter for SilentPrompter {
        fn read_line(&mut self, _prompt: &str) -> Result<String, AgentError> {
            Err(AgentError::InputClosed)
        }

        fn say(&mut self, _message: &str) {}
    }

    fn test_agent() -> RouterAgent {
        RouterAgent::new(AppConfig {
            model: ModelConfig {
                base_url: "http://localhost:9".to_string(),
                api_key: None,
                model_name: "test".to_string(),
                temperature: 0.7,
                max_tokens: 256,
            },
            smtp: SmtpConfig {
                server: "smtp.example.com".to_string(),
                port: 587,
                sender_name: "Alex".to_string(),
                sender_email: "alex@example.com".to_string(),
                sender_password: "secret".to_string(),
            },
            search: SearchConfig::default(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_close_with_no_open_document() {
        let mut agent = test_agent();
        let reply = agent.respond("close the document", &mut SilentPrompter).await;
        assert_eq!(reply, "No document is currently open.");
        assert!(agent.document_name().is_none(), "session must be unchanged");
    }

    #[tokio::test]
    async fn test_close_reports_the_closed_name() {
        use crate::agent::session::ActiveDocument;

        let mut agent = test_agent();
        agent.session.open(ActiveDocument {
            name: "report.pdf".to_string(),
            content: "body".to_string(),
            summary: "summary".to_string(),
        });

        let reply = agent.respond("close the document", &mut SilentPrompter).await;
        assert!(reply.contains("report.pdf"));
        assert!(agent.document_name().is_none());
    }

    #[tokio::test]
    async fn test_document_workflow_error_becomes_message() {
        // Input closes immediately — the workflow aborts with a message,
        // not a panic, and the session stays inactive.
        let mut agent = test_agent();
        let reply = agent.respond("summarize the document", &mut SilentPrompter).await;
        assert!(reply.starts_with("Error in document workflow:"));
        assert!(agent.document_name().is_none());
    }

    #[tokio::test]
    async fn test_email_workflow_error_becomes_message() {
        let mut agent = test_agent();
        let reply = agent
            .respond("draft an email about the launch", &mut SilentPrompter)
            .await;
        assert!(reply.starts_with("Error in email workflow:"));
    }
}
