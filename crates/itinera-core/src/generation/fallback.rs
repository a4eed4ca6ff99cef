//! Terminal fallback policies.
//!
//! When a run exhausts its retry budget the generator asks its
//! [`FallbackPolicy`] for a substitute plan. [`NoFallback`] refuses, so the
//! run fails; [`BaselineFallback`] returns a canned plan adjusted to the
//! request. Production wiring must use [`NoFallback`].

use crate::itinerary::{Activity, Day, GenerationRequest, TravelPlan};
use crate::plan::{DEFAULT_REMINDER, default_remarks};

/// Strategy consulted once a run has spent its retry budget.
pub trait FallbackPolicy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// A substitute plan for `request`, or `None` to let the run fail.
    fn fallback_plan(&self, request: &GenerationRequest) -> Option<TravelPlan>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn FallbackPolicy) {}
};

// ---------------------------------------------------------------------------
// NoFallback
// ---------------------------------------------------------------------------

/// Never substitutes a plan.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFallback;

impl FallbackPolicy for NoFallback {
    fn name(&self) -> &str {
        "none"
    }

    fn fallback_plan(&self, _request: &GenerationRequest) -> Option<TravelPlan> {
        None
    }
}

// ---------------------------------------------------------------------------
// BaselineFallback
// ---------------------------------------------------------------------------

/// The embedded baseline plan TOML.
static BASELINE_TOML: &str = include_str!("baseline_plan.toml");

/// Load the embedded baseline plan.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed. The file is compiled into the
/// binary, so a build that passes its tests carries a valid plan.
pub fn load_baseline_plan() -> TravelPlan {
    toml::from_str(BASELINE_TOML).expect("embedded baseline_plan.toml is invalid")
}

/// Substitutes the canned baseline plan, retitled for the request and
/// resized to its duration.
#[derive(Debug, Clone)]
pub struct BaselineFallback {
    baseline: TravelPlan,
}

impl BaselineFallback {
    pub fn new() -> Self {
        Self {
            baseline: load_baseline_plan(),
        }
    }

    /// Use a custom baseline instead of the embedded one.
    pub fn with_baseline(baseline: TravelPlan) -> Self {
        Self { baseline }
    }
}

impl Default for BaselineFallback {
    fn default() -> Self {
        Self::new()
    }
}

impl FallbackPolicy for BaselineFallback {
    fn name(&self) -> &str {
        "baseline"
    }

    fn fallback_plan(&self, request: &GenerationRequest) -> Option<TravelPlan> {
        let mut plan = self.baseline.clone();
        plan.title = format!("Trip to {}", request.destination);
        plan.destination = request.destination.clone();
        plan.remarks = default_remarks(request);

        let duration = request.duration as usize;
        plan.days.truncate(duration);
        while plan.days.len() < duration {
            plan.days.push(placeholder_day(plan.days.len() as u32 + 1));
        }
        for (index, day) in plan.days.iter_mut().enumerate() {
            day.day_number = index as u32 + 1;
            day.date = None;
        }
        Some(plan)
    }
}

fn placeholder_day(day_number: u32) -> Day {
    Day {
        day_number,
        description: format!("Day {day_number} exploration"),
        reminder: DEFAULT_REMINDER.to_string(),
        activities: vec![Activity {
            location: "Local attraction".to_string(),
            activity: "Explore local attractions".to_string(),
            tips: "Ask locals for recommendations".to_string(),
            start_at: "10:00".to_string(),
            end_at: "12:00".to_string(),
        }],
        date: None,
    }
}
