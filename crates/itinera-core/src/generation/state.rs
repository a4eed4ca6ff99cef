//! Per-run generation state and the phase enum that drives it.

use serde_json::Value;
use uuid::Uuid;

use crate::error::GenerationError;
use crate::itinerary::{GenerationRequest, TravelPlan};
use crate::plan::TimeRepair;

/// Phase of a generation run.
///
/// ```text
/// Generating{false} -> Validating          (candidate produced, or step failed below the cap)
/// Generating{_}     -> Succeeded | Failed  (retry cap reached; fallback decides)
/// Validating        -> Succeeded           (no error, validator passed)
/// Validating        -> Generating{true}    (validator rejected the candidate)
/// Validating        -> Generating{false}   (generate step already failed and counted)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Produce a candidate plan. `pending_retry` marks re-entry after a
    /// validation failure that has not been counted yet.
    Generating { pending_retry: bool },
    Validating,
    Succeeded,
    Failed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Succeeded | Phase::Failed)
    }
}

/// Everything a single run knows. Created fresh per run and never shared.
#[derive(Debug, Clone)]
pub struct GenerationState {
    /// Log correlation id.
    pub run_id: Uuid,
    pub request: GenerationRequest,
    pub phase: Phase,
    /// Normalized JSON produced by the last successful generate step.
    pub candidate: Option<Value>,
    /// Typed plan, present once the run has succeeded.
    pub plan: Option<TravelPlan>,
    /// Message of the most recent recoverable failure; empty when there is
    /// none. On a failed run, the final retry-budget message.
    pub error: String,
    pub retry_count: u32,
    /// Time corrections made while validating the accepted plan.
    pub repairs: Vec<TimeRepair>,
    /// The plan came from the fallback policy, not the model.
    pub used_fallback: bool,
    /// Terminal error, set only when the run ends in [`Phase::Failed`].
    pub failure: Option<GenerationError>,
    pub generation_passes: u32,
    pub validation_passes: u32,
}

impl GenerationState {
    pub fn new(request: GenerationRequest) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            request,
            phase: Phase::Generating {
                pending_retry: false,
            },
            candidate: None,
            plan: None,
            error: String::new(),
            retry_count: 0,
            repairs: Vec::new(),
            used_fallback: false,
            failure: None,
            generation_passes: 0,
            validation_passes: 0,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.phase == Phase::Succeeded
    }
}
