//! The `ModelClient` trait -- the adapter interface for language models.
//!
//! The trait is object-safe so it can be stored as `Arc<dyn ModelClient>`
//! and shared by concurrent generation runs.

use async_trait::async_trait;

use crate::error::ModelError;

/// A two-part chat prompt: a system instruction and a user instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    /// Role, output schema, and formatting rules.
    pub system: String,
    /// The concrete request (trip parameters, question, ...).
    pub user: String,
}

/// Sends a prompt to a language-generation service and returns raw text.
///
/// Implementations must not retry or back off on their own; the generation
/// state machine owns the retry budget. Output is untrusted: it may be empty,
/// wrapped in commentary, or not JSON at all.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Human-readable name for this client (e.g. "chat-completions").
    fn name(&self) -> &str;

    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &PromptRequest) -> Result<String, ModelError>;
}

// Compile-time assertion: ModelClient must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn ModelClient) {}
};
