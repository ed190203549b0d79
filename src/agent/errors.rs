//! Agent core error types.

use thiserror::Error;

use crate::inference::InferenceError;
use crate::tools::document::DocumentError;

/// Errors that can occur while routing and answering a query.
///
/// Every workflow and orchestrator boundary converts these into a
/// descriptive string for the user; nothing here escapes as a crash.
#[derive(Debug, Error)]
pub enum AgentError {
    /// A model call failed (network, HTTP, malformed response).
    #[error("model call failed: {0}")]
    Inference(#[from] InferenceError),

    /// A document could not be read.
    #[error("{0}")]
    Document(#[from] DocumentError),

    /// The document was read but contains no text.
    #[error("document appears to be empty or unreadable")]
    EmptyDocument,

    /// The model requested a tool that is not registered. Fails the round.
    #[error("the model requested an unknown tool: '{name}'")]
    UnknownTool { name: String },

    /// Draft generation failed inside the email workflow.
    #[error("failed to generate email: {reason}")]
    DraftGeneration { reason: String },

    /// The interactive input source closed mid-dialog (EOF or interrupt).
    #[error("input closed")]
    InputClosed,
}
