//! Model client interface for language-generation services.
//!
//! The pipeline never talks to a provider directly: it holds an
//! `Arc<dyn ModelClient>` handed to it by the caller, so tests can inject
//! scripted doubles and deployments can swap providers.
//!
//! ```text
//! PlanGenerator / regenerate_day / suggest
//!     |
//!     | generate(&PromptRequest { system, user })
//!     v
//! dyn ModelClient ----> ChatCompletionsClient --HTTP--> provider
//!     |
//!     v
//! Result<String, ModelError>
//! ```

pub mod chat_completions;
pub mod trait_def;

pub use chat_completions::{ChatCompletionsClient, ChatCompletionsConfig};
pub use trait_def::{ModelClient, PromptRequest};
