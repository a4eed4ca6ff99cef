//! Error taxonomy for the itinerary pipeline.
//!
//! Model, extraction, and structure errors are recoverable: the generation
//! state machine records their messages and retries. Only [`GenerationError`]
//! crosses the generator boundary: an exhausted retry budget, or a request
//! rejected before any model call.

use thiserror::Error;

/// Failure reported by a [`crate::model::ModelClient`].
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("HTTP request to model provider failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode model provider response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("model provider response has no message content")]
    MissingContent,

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("model client misconfigured: {0}")]
    Config(String),

    /// Catch-all used by test doubles and custom adapters.
    #[error("{0}")]
    Other(String),
}

/// The extractor could not isolate a JSON object in the model text.
#[derive(Debug, Error)]
pub enum MalformedResponseError {
    #[error("no opening brace found in model response")]
    NoOpeningBrace,

    #[error("no closing brace found after the opening brace in model response")]
    NoClosingBrace,

    #[error("model response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// A plan (or single day) is missing a required field or has the wrong shape.
#[derive(Debug, Error)]
pub enum PlanStructureError {
    #[error("Travel plan is missing required field: {0}")]
    MissingPlanField(&'static str),

    #[error("Travel plan days must be a non-empty list")]
    EmptyDays,

    #[error("Day is missing required field: {0}")]
    MissingDayField(&'static str),

    #[error("Activities must be a list")]
    ActivitiesNotList,

    #[error("Activities must be a non-empty list")]
    EmptyActivities,

    #[error("Activity is missing required field: {0}")]
    MissingActivityField(&'static str),

    #[error("{0} must be a JSON object")]
    NotAnObject(&'static str),

    #[error("Travel plan has {actual} days but {expected} were requested")]
    DayCountMismatch { expected: u32, actual: usize },

    #[error("Day at position {position} has day_number {found}, expected {position}")]
    DayNumberOutOfSequence { position: usize, found: i64 },

    #[error("Travel plan has an invalid value: {0}")]
    InvalidValue(#[from] serde_json::Error),
}

/// One failed generate or validate step, as recorded by the state machine.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("model unavailable: {0}")]
    ModelUnavailable(#[from] ModelError),

    #[error(transparent)]
    MalformedResponse(#[from] MalformedResponseError),

    #[error(transparent)]
    PlanStructure(#[from] PlanStructureError),
}

/// Terminal failure of a generation run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Failed after {retry_count} retries. Last error: {last_error}")]
    RetryBudgetExhausted { retry_count: u32, last_error: String },

    #[error("invalid generation request: {0}")]
    InvalidRequest(#[from] RequestError),
}

/// Invalid [`crate::itinerary::GenerationRequest`] parameters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("destination must not be empty")]
    EmptyDestination,

    #[error("duration must be at least one day")]
    ZeroDuration,
}

/// Failure of a one-shot travel suggestion.
#[derive(Debug, Error)]
pub enum SuggestionError {
    #[error("model unavailable: {0}")]
    ModelUnavailable(#[from] ModelError),

    #[error("query must not be empty")]
    EmptyQuery,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structure_messages_name_the_field() {
        assert_eq!(
            PlanStructureError::MissingPlanField("tips").to_string(),
            "Travel plan is missing required field: tips"
        );
        assert_eq!(
            PlanStructureError::MissingActivityField("end_at").to_string(),
            "Activity is missing required field: end_at"
        );
    }

    #[test]
    fn step_error_is_transparent_for_structure_errors() {
        let err = StepError::from(PlanStructureError::EmptyDays);
        assert_eq!(err.to_string(), "Travel plan days must be a non-empty list");
    }

    #[test]
    fn exhausted_message_carries_count_and_last_error() {
        let err = GenerationError::RetryBudgetExhausted {
            retry_count: 3,
            last_error: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Failed after 3 retries. Last error: boom");
    }
}
