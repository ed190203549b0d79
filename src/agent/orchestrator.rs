//! Conversation orchestration.
//!
//! Tool-eligible queries run a two-phase round:
//! 1. **Ask** — send `[system, user]` with the full tool spec set and
//!    `tool_choice=auto`. If the model answers in text, that is the result.
//! 2. **Execute & finalize** — otherwise dispatch each requested call in
//!    order, append a tool message per call, and resend the transcript
//!    *without* tool specs for the final natural-language answer.
//!
//! Exactly one tool round is performed per query — tool calls requested
//! during phase 2 are ignored rather than recursed into. Plain chat and
//! document follow-up are single-shot rounds with no tool specs at all.

use crate::inference::types::{ChatMessage, SamplingOverrides};
use crate::inference::ChatClient;
use crate::tools::{ToolDispatcher, ToolError};

use super::errors::AgentError;
use super::session::ActiveDocument;

// ─── Constants ───────────────────────────────────────────────────────────────

/// How much document text is embedded into a system prompt, in bytes.
/// Keeps large documents inside the model's context window.
pub(crate) const DOCUMENT_CONTEXT_BUDGET: usize = 8_000;

pub(crate) const WEATHER_SYSTEM_PROMPT: &str =
    "You are a helpful weather assistant. Use the get_weather function.";

pub(crate) const SEARCH_SYSTEM_PROMPT: &str =
    "You are a helpful assistant for locating files and folders.";

pub(crate) const GENERIC_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

// ─── UTF-8 Safe Truncation ──────────────────────────────────────────────────

/// Truncate a string to at most `max_bytes` bytes on a valid UTF-8 char boundary.
///
/// If the byte at `max_bytes` is inside a multi-byte character, the slice is
/// shortened to the preceding character boundary.
pub(crate) fn truncate_utf8(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    // Walk backward to find a valid char boundary
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// ─── Rounds ──────────────────────────────────────────────────────────────────

/// Run one two-phase tool round for a tool-eligible query.
pub async fn run_tool_round(
    chat: &ChatClient,
    dispatcher: &ToolDispatcher,
    system_prompt: &str,
    query: &str,
) -> Result<String, AgentError> {
    let mut messages = vec![ChatMessage::system(system_prompt), ChatMessage::user(query)];

    // ── Phase 1: ask, offering the full tool set ────────────────────────
    let completion = chat
        .chat_completion(
            messages.clone(),
            Some(dispatcher.registry().to_openai_tools()),
            None,
        )
        .await?;

    if completion.tool_calls.is_empty() {
        return Ok(completion.text().to_string());
    }

    tracing::info!(
        tool_calls = completion.tool_calls.len(),
        "model requested tool execution"
    );

    // Echo the assistant's tool-call message into the transcript
    let raw_calls = completion.raw_tool_calls.clone().unwrap_or_default();
    messages.push(ChatMessage::assistant_with_tools(
        completion.content.clone(),
        raw_calls,
    ));

    // ── Execute each call in order ──────────────────────────────────────
    for call in &completion.tool_calls {
        let outcome = dispatcher.dispatch(call, chat).await.map_err(|e| match e {
            ToolError::UnknownTool { name } => AgentError::UnknownTool { name },
        })?;
        messages.push(ChatMessage::tool(
            call.id.clone(),
            outcome.to_message_content(),
        ));
    }

    // ── Phase 2: final answer, no tool specs this time ──────────────────
    let final_completion = chat.chat_completion(messages, None, None).await?;

    if !final_completion.tool_calls.is_empty() {
        // Single-round contract: no recursive tool use
        tracing::warn!("model requested tools during the final phase — ignoring");
    }

    match final_completion.content {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Ok("The tool ran, but the model returned no final answer.".to_string()),
    }
}

/// Run a single-shot chat round with no tools.
pub async fn run_chat_round(
    chat: &ChatClient,
    system_prompt: &str,
    query: &str,
    sampling: Option<SamplingOverrides>,
) -> Result<String, AgentError> {
    let messages = vec![ChatMessage::system(system_prompt), ChatMessage::user(query)];
    let completion = chat.chat_completion(messages, None, sampling).await?;
    Ok(completion.text().to_string())
}

/// Answer a follow-up question from the active document's stored content.
///
/// No tools are offered and nothing is re-read from disk — the system
/// message embeds exactly the content captured when the document was
/// opened, truncated to [`DOCUMENT_CONTEXT_BUDGET`].
pub async fn run_document_round(
    chat: &ChatClient,
    document: &ActiveDocument,
    query: &str,
) -> Result<String, AgentError> {
    let system_prompt = document_qa_system_prompt(document);
    run_chat_round(
        chat,
        &system_prompt,
        query,
        Some(SamplingOverrides::temperature(0.3)),
    )
    .await
}

/// Build the document-QA system prompt around the stored content.
pub(crate) fn document_qa_system_prompt(document: &ActiveDocument) -> String {
    format!(
        "You are an AI assistant that answers questions about a specific document.\n\n\
         Document: {}\n\n\
         You should:\n\
         1. Answer questions based ONLY on the document content provided\n\
         2. If the answer isn't in the document, say so clearly\n\
         3. Provide specific references or quotes when possible\n\
         4. Be accurate and helpful\n\n\
         Document Content:\n{}",
        document.name,
        truncate_utf8(&document.content, DOCUMENT_CONTEXT_BUDGET)
    )
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_utf8_short_string_untouched() {
        assert_eq!(truncate_utf8("hello", 100), "hello");
    }

    #[test]
    fn test_truncate_utf8_cuts_at_char_boundary() {
        // 'é' is two bytes in UTF-8; cutting at byte 1 must back off to 0
        let s = "é";
        assert_eq!(truncate_utf8(s, 1), "");
        assert_eq!(truncate_utf8(s, 2), "é");
    }

    #[test]
    fn test_truncate_utf8_exact_boundary() {
        let s = "abcdef";
        assert_eq!(truncate_utf8(s, 3), "abc");
        assert_eq!(truncate_utf8(s, 6), "abcdef");
    }

    #[test]
    fn test_document_prompt_embeds_stored_content() {
        let document = ActiveDocument {
            name: "report.pdf".to_string(),
            content: "the conclusion is on page nine".to_string(),
            summary: String::new(),
        };
        let prompt = document_qa_system_prompt(&document);
        assert!(prompt.contains("Document: report.pdf"));
        assert!(prompt.contains("the conclusion is on page nine"));
    }

    #[test]
    fn test_document_prompt_respects_budget() {
        let document = ActiveDocument {
            name: "big.txt".to_string(),
            content: "x".repeat(DOCUMENT_CONTEXT_BUDGET * 2),
            summary: String::new(),
        };
        let prompt = document_qa_system_prompt(&document);
        // Prompt scaffolding plus at most the budget's worth of content
        assert!(prompt.len() < DOCUMENT_CONTEXT_BUDGET + 600);
    }
}
