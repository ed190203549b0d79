//! OpenAI-compatible inference client.
//!
//! Sends non-streaming chat completion requests to the configured endpoint
//! and decodes either plain text or tool calls from the response.

use std::time::Duration;

use reqwest::Client as HttpClient;
use uuid::Uuid;

use crate::config::ModelConfig;

use super::errors::InferenceError;
use super::types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Completion, SamplingOverrides,
    ToolCall, ToolCallResponse, ToolDefinition,
};

// ─── Constants ───────────────────────────────────────────────────────────────

/// TCP connection timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Total request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// ─── ChatClient ──────────────────────────────────────────────────────────────

/// Client for the chat-completion endpoint.
///
/// Created from [`ModelConfig`] and reused for every request in the
/// process. Does NOT check connectivity at construction — that happens on
/// the first request.
pub struct ChatClient {
    http: HttpClient,
    config: ModelConfig,
}

impl ChatClient {
    /// Create a new chat client from the model configuration.
    pub fn new(config: ModelConfig) -> Result<Self, InferenceError> {
        let http = HttpClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| InferenceError::ConnectionFailed {
                endpoint: config.base_url.clone(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { http, config })
    }

    /// The configured model identifier.
    pub fn model_name(&self) -> &str {
        &self.config.model_name
    }

    /// Send a chat completion request.
    ///
    /// When `tools` is present, `tool_choice=auto` is sent alongside so the
    /// model may answer directly or request tool invocations. Returns a
    /// [`Completion`] carrying the text and/or parsed tool calls.
    pub async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        tools: Option<Vec<ToolDefinition>>,
        sampling: Option<SamplingOverrides>,
    ) -> Result<Completion, InferenceError> {
        let url = format!("{}/chat/completions", self.config.base_url);

        let temperature = sampling
            .as_ref()
            .and_then(|s| s.temperature)
            .unwrap_or(self.config.temperature);
        let top_p = sampling.as_ref().and_then(|s| s.top_p);

        let body = ChatCompletionRequest {
            model: self.config.model_name.clone(),
            messages,
            tool_choice: tools.as_ref().map(|_| "auto".to_string()),
            tools,
            temperature,
            top_p,
            max_tokens: self.config.max_tokens,
            stream: false,
        };

        // Log request metadata (not the full body — document context can be huge)
        tracing::info!(
            url = %url,
            model = %body.model,
            message_count = body.messages.len(),
            has_tools = body.tools.is_some(),
            tool_count = body.tools.as_ref().map(|t| t.len()).unwrap_or(0),
            "chat completion request"
        );

        let mut request = self.http.post(&url).json(&body);
        if let Some(ref key) = self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                InferenceError::Timeout {
                    duration_secs: REQUEST_TIMEOUT.as_secs(),
                }
            } else {
                InferenceError::ConnectionFailed {
                    endpoint: url.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(InferenceError::HttpError {
                status: status.as_u16(),
                body: body_text,
            });
        }

        let decoded: ChatCompletionResponse =
            response
                .json()
                .await
                .map_err(|e| InferenceError::MalformedResponse {
                    reason: e.to_string(),
                })?;

        let choice = decoded
            .choices
            .into_iter()
            .next()
            .ok_or(InferenceError::EmptyResponse)?;

        let raw_tool_calls = choice.message.tool_calls;
        let tool_calls = raw_tool_calls
            .as_deref()
            .map(parse_tool_calls)
            .unwrap_or_default();

        tracing::info!(
            finish_reason = choice.finish_reason.as_deref().unwrap_or("none"),
            tool_call_count = tool_calls.len(),
            has_content = choice.message.content.is_some(),
            "chat completion response"
        );

        Ok(Completion {
            content: choice.message.content,
            tool_calls,
            raw_tool_calls,
        })
    }
}

// ─── Tool Call Parsing ───────────────────────────────────────────────────────

/// Decode the response's tool calls into validated [`ToolCall`]s.
///
/// Missing ids are synthesized (`call_{uuid}`) so tool-result messages can
/// always be correlated. Malformed argument JSON is kept as an empty object
/// — the dispatcher will surface a failed outcome for the call rather than
/// the whole round crashing.
fn parse_tool_calls(raw: &[ToolCallResponse]) -> Vec<ToolCall> {
    raw.iter()
        .map(|tc| {
            let id = tc
                .id
                .clone()
                .unwrap_or_else(|| format!("call_{}", Uuid::new_v4()));
            let arguments = match serde_json::from_str(&tc.function.arguments) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(
                        tool = %tc.function.name,
                        error = %e,
                        "tool call arguments are not valid JSON"
                    );
                    serde_json::json!({})
                }
            };
            ToolCall {
                id,
                name: tc.function.name.clone(),
                arguments,
            }
        })
        .collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
