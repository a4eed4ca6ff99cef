//! Free-text travel suggestions: one model call, no retries.

use serde::Serialize;

use crate::error::{ModelError, SuggestionError};
use crate::model::ModelClient;
use crate::plan::build_suggestion_prompt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub destination: String,
    pub query: String,
    pub suggestion: String,
}

/// Ask the travel advisor prompt about `destination`.
pub async fn suggest(
    client: &dyn ModelClient,
    destination: &str,
    query: &str,
) -> Result<Suggestion, SuggestionError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(SuggestionError::EmptyQuery);
    }

    let prompt = build_suggestion_prompt(destination, query);
    let suggestion = client.generate(&prompt).await?;
    if suggestion.trim().is_empty() {
        return Err(SuggestionError::ModelUnavailable(ModelError::EmptyResponse));
    }
    tracing::debug!(destination, chars = suggestion.len(), "received travel suggestion");

    Ok(Suggestion {
        destination: destination.to_string(),
        query: query.to_string(),
        suggestion,
    })
}
