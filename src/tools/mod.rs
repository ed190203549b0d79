//! Tool registry and dispatch.
//!
//! The registry holds the fixed set of tool specs offered to the model.
//! The dispatcher binds a model-issued [`ToolCall`] to the matching
//! collaborator and converts every collaborator failure into a
//! [`ToolOutcome`] — a failed call must still produce a tool-role message
//! the model can react to. Only an unregistered tool name is an error,
//! and it fails the whole round.

pub mod document;
pub mod email;
pub mod search;
pub mod weather;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::inference::types::{FunctionDefinition, ToolCall, ToolDefinition};
use crate::inference::ChatClient;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Dispatch contract violations.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The model requested a tool outside the registry. This is an internal
    /// invariant violation, not a user condition: the model was given the
    /// exact spec set, so the round fails rather than retrying.
    #[error("unknown tool: '{name}'")]
    UnknownTool { name: String },
}

// ─── ToolSpec / ToolRegistry ─────────────────────────────────────────────────

/// An immutable tool description registered at startup.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON-Schema object describing the parameters.
    pub parameters: serde_json::Value,
}

/// The fixed, compile-time-known set of tools offered to the model.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<ToolSpec>,
}

impl ToolRegistry {
    /// The built-in tool set: weather, search, email generation.
    pub fn builtin() -> Self {
        let tools = vec![
            ToolSpec {
                name: "get_weather".to_string(),
                description: "Get current temperature for provided coordinates in celsius."
                    .to_string(),
                parameters: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "latitude": {"type": "number", "description": "Latitude coordinate"},
                        "longitude": {"type": "number", "description": "Longitude coordinate"}
                    },
                    "required": ["latitude", "longitude"]
                }),
            },
            ToolSpec {
                name: "search_file_or_folder".to_string(),
                description: "Search for a file (with extension) or a folder across the \
                              configured search roots."
                    .to_string(),
                parameters: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "name": {
                            "type": "string",
                            "description": "Name of the file (with extension) or folder"
                        }
                    },
                    "required": ["name"]
                }),
            },
            ToolSpec {
                name: "generate_email".to_string(),
                description: "Generate an email about a specific topic with proper formatting."
                    .to_string(),
                parameters: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "topic": {
                            "type": "string",
                            "description": "The main topic or purpose of the email"
                        },
                        "recipient_name": {
                            "type": "string",
                            "description": "Name of the recipient to personalize the email"
                        },
                        "tone": {
                            "type": "string",
                            "description": "Tone of the email: professional, casual, formal, friendly"
                        }
                    },
                    "required": ["topic"]
                }),
            },
        ];

        Self { tools }
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// All registered tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Serialize all tool specs into OpenAI function-calling format.
    ///
    /// Used to populate the `tools` field in chat completion requests.
    pub fn to_openai_tools(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|spec| ToolDefinition {
                r#type: "function".to_string(),
                function: FunctionDefinition {
                    name: spec.name.clone(),
                    description: spec.description.clone(),
                    parameters: spec.parameters.clone(),
                },
            })
            .collect()
    }
}

// ─── ToolOutcome ─────────────────────────────────────────────────────────────

/// The result of one tool invocation, serialized whole as the tool-message
/// content so the model sees success and failure in the same shape.
#[derive(Debug, Clone, Serialize)]
pub struct ToolOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolOutcome {
    /// A successful outcome carrying the collaborator's payload.
    pub fn ok(result: serde_json::Value) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    /// A failed outcome carrying the collaborator's error message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(message.into()),
        }
    }

    /// JSON-encode this outcome for the tool-role message content.
    pub fn to_message_content(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"success":false,"error":"outcome serialization failed: {e}"}}"#)
        })
    }
}

// ─── Dispatcher ──────────────────────────────────────────────────────────────

/// Arguments for the search tool.
#[derive(Debug, Deserialize)]
struct SearchArgs {
    name: String,
}

/// Arguments for the email-generation tool.
#[derive(Debug, Deserialize)]
struct GenerateEmailArgs {
    topic: String,
    #[serde(default)]
    recipient_name: String,
    #[serde(default = "default_tone")]
    tone: String,
}

fn default_tone() -> String {
    "professional".to_string()
}

/// Binds model tool calls to collaborator invocations.
pub struct ToolDispatcher {
    registry: ToolRegistry,
    http: reqwest::Client,
    search_roots: Vec<PathBuf>,
    sender_name: String,
}

impl ToolDispatcher {
    pub fn new(search_roots: Vec<PathBuf>, sender_name: String) -> Self {
        Self {
            registry: ToolRegistry::builtin(),
            http: reqwest::Client::new(),
            search_roots,
            sender_name,
        }
    }

    /// The registered tool specs.
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Invoke the collaborator behind a tool call.
    ///
    /// Collaborator failures (network, filesystem, generation) come back as
    /// failed [`ToolOutcome`]s; only an unregistered tool name is an `Err`.
    pub async fn dispatch(
        &self,
        call: &ToolCall,
        chat: &ChatClient,
    ) -> Result<ToolOutcome, ToolError> {
        tracing::info!(tool = %call.name, call_id = %call.id, "dispatching tool call");

        let outcome = match call.name.as_str() {
            "get_weather" => self.dispatch_weather(call).await,
            "search_file_or_folder" => self.dispatch_search(call),
            "generate_email" => self.dispatch_generate_email(call, chat).await,
            other => {
                return Err(ToolError::UnknownTool {
                    name: other.to_string(),
                })
            }
        };

        if !outcome.success {
            tracing::warn!(
                tool = %call.name,
                error = outcome.error.as_deref().unwrap_or("unknown"),
                "tool call failed"
            );
        }

        Ok(outcome)
    }

    async fn dispatch_weather(&self, call: &ToolCall) -> ToolOutcome {
        let args: weather::WeatherArgs = match serde_json::from_value(call.arguments.clone()) {
            Ok(args) => args,
            Err(e) => return ToolOutcome::failure(format!("invalid weather arguments: {e}")),
        };

        match weather::current_conditions(&self.http, &args).await {
            Ok(current) => ToolOutcome::ok(current),
            Err(e) => ToolOutcome::failure(e.to_string()),
        }
    }

    fn dispatch_search(&self, call: &ToolCall) -> ToolOutcome {
        let args: SearchArgs = match serde_json::from_value(call.arguments.clone()) {
            Ok(args) => args,
            Err(e) => return ToolOutcome::failure(format!("invalid search arguments: {e}")),
        };

        let results = search::search_file_or_folder(&self.search_roots, &args.name);
        let message = if results.is_empty() {
            "No matching files or folders found.".to_string()
        } else {
            format!("{} match(es) found.", results.len())
        };

        ToolOutcome::ok(serde_json::json!({
            "results": results,
            "message": message,
        }))
    }

    async fn dispatch_generate_email(&self, call: &ToolCall, chat: &ChatClient) -> ToolOutcome {
        let args: GenerateEmailArgs = match serde_json::from_value(call.arguments.clone()) {
            Ok(args) => args,
            Err(e) => return ToolOutcome::failure(format!("invalid email arguments: {e}")),
        };

        match email::generate_draft(
            chat,
            &args.topic,
            &args.recipient_name,
            &args.tone,
            &self.sender_name,
        )
        .await
        {
            Ok(draft) => ToolOutcome::ok(serde_json::json!({
                "subject": draft.subject,
                "body": draft.body,
            })),
            Err(e) => ToolOutcome::failure(format!("failed to generate email: {e}")),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
