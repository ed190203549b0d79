//! OpenAI-compatible chat-completion client.
//!
//! The assistant treats the model endpoint as an opaque remote procedure:
//! an ordered message list goes out, either plain text or tool calls come
//! back. Wire types mirror the Chat Completions API.

pub mod client;
pub mod errors;
pub mod types;

pub use client::ChatClient;
pub use errors::InferenceError;
