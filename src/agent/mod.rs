//! Routing and orchestration core.
//!
//! A query flows: [`router::RouterAgent`] consults the
//! [`intent::IntentClassifier`] and the [`session::DocumentSession`], then
//! dispatches to a blocking workflow ([`workflows`]), a tool round
//! ([`orchestrator`]), or a plain chat round.

pub mod errors;
pub mod intent;
pub mod orchestrator;
pub mod router;
pub mod session;
pub mod workflows;

pub use errors::AgentError;
pub use intent::{Intent, IntentClassifier};
pub use router::RouterAgent;
pub use session::{ActiveDocument, DocumentSession};
pub use workflows::Prompter;
