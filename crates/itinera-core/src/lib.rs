//! AI travel-itinerary generation.
//!
//! [`PlanGenerator`] turns a [`GenerationRequest`] into a validated
//! [`TravelPlan`] by prompting a [`ModelClient`], extracting and normalizing
//! the JSON it returns, and validating the result, retrying a bounded number
//! of times. [`regenerate_day`] redoes one day of an existing plan and
//! [`suggest`] answers free-text travel questions.

pub mod error;
pub mod generation;
pub mod itinerary;
pub mod model;
pub mod plan;
pub mod regenerate;
pub mod suggest;

pub use error::{
    GenerationError, MalformedResponseError, ModelError, PlanStructureError, RequestError,
    StepError, SuggestionError,
};
pub use generation::{
    BaselineFallback, FallbackPolicy, GeneratedPlan, GenerationState, MAX_RETRIES, NoFallback,
    Phase, PlanGenerator,
};
pub use itinerary::{Activity, Day, GenerationRequest, TravelPlan};
pub use model::{ChatCompletionsClient, ChatCompletionsConfig, ModelClient, PromptRequest};
pub use regenerate::{DayRegeneration, RegenerationStatus, regenerate_day};
pub use suggest::{Suggestion, suggest};
