//! Bounded-retry itinerary generation.
//!
//! A run is an explicit state machine over [`Phase`]:
//!
//! ```text
//!            +--------------------+
//!            | Generating{retry?} | prompt -> model -> extract -> normalize
//!            +---------+----------+
//!                      |
//!                      v
//!              +---------------+
//!              |  Validating   | check -> repair -> decode
//!              +-------+-------+
//!                      |
//!        ok            |  error, retries left
//!   +------------------+--------------------+
//!   v                                       v
//! Succeeded                         Generating{...}
//!
//! retry cap reached -> FallbackPolicy -> Succeeded (fallback) | Failed
//! ```
//!
//! Every recoverable error (model, extraction, structure) is recorded in the
//! state and retried; only [`GenerationError`] leaves the generator. A request
//! that fails [`GenerationRequest::validate`] goes straight to `Failed`
//! without calling the model or the fallback policy.

pub mod fallback;
pub mod state;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

pub use fallback::{BaselineFallback, FallbackPolicy, NoFallback, load_baseline_plan};
pub use state::{GenerationState, Phase};

use crate::error::{GenerationError, StepError};
use crate::itinerary::{GenerationRequest, TravelPlan};
use crate::model::ModelClient;
use crate::plan::{TimeRepair, build_plan_prompt, extract_json, normalize_plan, validate_plan};

/// Retries allowed after the first attempt.
pub const MAX_RETRIES: u32 = 3;

/// Successful outcome of [`PlanGenerator::generate`].
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedPlan {
    pub destination: String,
    pub duration: u32,
    pub plan: TravelPlan,
    pub retry_count: u32,
    pub used_fallback: bool,
    pub repairs: Vec<TimeRepair>,
}

impl GenerationState {
    /// Collapse a finished run into its outward result.
    pub fn into_result(self) -> Result<GeneratedPlan, GenerationError> {
        match (self.plan, self.failure) {
            (Some(plan), _) => Ok(GeneratedPlan {
                destination: self.request.destination,
                duration: self.request.duration,
                plan,
                retry_count: self.retry_count,
                used_fallback: self.used_fallback,
                repairs: self.repairs,
            }),
            (None, Some(failure)) => Err(failure),
            (None, None) => Err(GenerationError::RetryBudgetExhausted {
                retry_count: self.retry_count,
                last_error: self.error,
            }),
        }
    }
}

/// Drives generation runs against an injected model client and fallback
/// policy. Holds no per-run state, so one generator can serve concurrent
/// runs.
#[derive(Clone)]
pub struct PlanGenerator {
    client: Arc<dyn ModelClient>,
    fallback: Arc<dyn FallbackPolicy>,
}

impl PlanGenerator {
    pub fn new(client: Arc<dyn ModelClient>, fallback: Arc<dyn FallbackPolicy>) -> Self {
        Self { client, fallback }
    }

    /// Generate a plan, or fail once the retry budget is spent.
    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GeneratedPlan, GenerationError> {
        self.run(request).await.into_result()
    }

    /// Run the state machine to a terminal phase and return the final state.
    pub async fn run(&self, request: GenerationRequest) -> GenerationState {
        let mut state = GenerationState::new(request);
        tracing::info!(
            run_id = %state.run_id,
            destination = %state.request.destination,
            duration = state.request.duration,
            model = self.client.name(),
            "starting itinerary generation"
        );

        if let Err(e) = state.request.validate() {
            let failure = GenerationError::from(e);
            tracing::error!(run_id = %state.run_id, error = %failure, "rejected generation request");
            state.error = failure.to_string();
            state.failure = Some(failure);
            state.phase = Phase::Failed;
            return state;
        }

        while !state.phase.is_terminal() {
            state.phase = match state.phase {
                Phase::Generating { pending_retry } => {
                    self.generate_step(&mut state, pending_retry).await
                }
                Phase::Validating => self.validate_step(&mut state),
                terminal => terminal,
            };
        }

        if let (Some(plan), Some(start_date)) = (state.plan.as_mut(), state.request.start_date) {
            plan.apply_start_date(start_date);
        }

        tracing::info!(
            run_id = %state.run_id,
            succeeded = state.succeeded(),
            retry_count = state.retry_count,
            used_fallback = state.used_fallback,
            repairs = state.repairs.len(),
            "itinerary generation finished"
        );
        state
    }

    async fn generate_step(&self, state: &mut GenerationState, pending_retry: bool) -> Phase {
        if pending_retry {
            state.retry_count += 1;
            if state.retry_count >= MAX_RETRIES {
                return self.terminate(state);
            }
        }

        state.generation_passes += 1;
        tracing::debug!(
            run_id = %state.run_id,
            attempt = state.generation_passes,
            retry_count = state.retry_count,
            "requesting plan from model"
        );

        match self.produce_candidate(&state.request).await {
            Ok(candidate) => {
                state.candidate = Some(candidate);
                state.error.clear();
                Phase::Validating
            }
            Err(e) => {
                state.retry_count += 1;
                state.error = e.to_string();
                state.candidate = None;
                tracing::warn!(
                    run_id = %state.run_id,
                    attempt = state.generation_passes,
                    retry_count = state.retry_count,
                    error = %e,
                    "plan generation attempt failed"
                );
                if state.retry_count >= MAX_RETRIES {
                    self.terminate(state)
                } else {
                    Phase::Validating
                }
            }
        }
    }

    /// Prompt, call the model, extract, and normalize.
    async fn produce_candidate(&self, request: &GenerationRequest) -> Result<Value, StepError> {
        let prompt = build_plan_prompt(request);
        let raw = self.client.generate(&prompt).await?;
        let mut candidate = extract_json(&raw)?;
        normalize_plan(&mut candidate, request);
        Ok(candidate)
    }

    fn validate_step(&self, state: &mut GenerationState) -> Phase {
        if !state.error.is_empty() {
            return self.route(state, false);
        }

        state.validation_passes += 1;
        let Some(candidate) = state.candidate.as_mut() else {
            state.error = "no candidate plan to validate".to_string();
            return self.route(state, true);
        };

        match validate_plan(candidate, Some(state.request.duration)) {
            Ok(validated) => {
                for repair in &validated.repairs {
                    tracing::debug!(
                        run_id = %state.run_id,
                        day = repair.day_position,
                        activity = repair.activity_index,
                        start_at = %repair.original_start_at,
                        end_at = %repair.original_end_at,
                        "reset invalid activity time"
                    );
                }
                state.plan = Some(validated.plan);
                state.repairs = validated.repairs;
                state.error.clear();
                self.route(state, true)
            }
            Err(e) => {
                state.error = StepError::from(e).to_string();
                tracing::warn!(
                    run_id = %state.run_id,
                    attempt = state.validation_passes,
                    retry_count = state.retry_count,
                    error = %state.error,
                    "plan failed validation"
                );
                self.route(state, true)
            }
        }
    }

    /// Routing after a validation pass. `uncounted` is true when the current
    /// error has not yet been charged to `retry_count`.
    fn route(&self, state: &mut GenerationState, uncounted: bool) -> Phase {
        if state.error.is_empty() {
            return Phase::Succeeded;
        }
        if state.retry_count >= MAX_RETRIES {
            return self.terminate(state);
        }
        Phase::Generating {
            pending_retry: uncounted,
        }
    }

    /// The retry budget is spent: let the fallback policy decide.
    fn terminate(&self, state: &mut GenerationState) -> Phase {
        if let Some(plan) = self.fallback.fallback_plan(&state.request) {
            tracing::warn!(
                run_id = %state.run_id,
                retry_count = state.retry_count,
                last_error = %state.error,
                policy = self.fallback.name(),
                "retry budget exhausted, substituting fallback plan"
            );
            state.plan = Some(plan);
            state.used_fallback = true;
            state.error.clear();
            return Phase::Succeeded;
        }

        let failure = GenerationError::RetryBudgetExhausted {
            retry_count: state.retry_count,
            last_error: std::mem::take(&mut state.error),
        };
        tracing::error!(
            run_id = %state.run_id,
            retry_count = state.retry_count,
            error = %failure,
            "itinerary generation failed"
        );
        state.error = failure.to_string();
        state.candidate = None;
        state.failure = Some(failure);
        Phase::Failed
    }
}
