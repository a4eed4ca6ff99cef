//! Plan pipeline stages: prompt construction, JSON extraction, normalization,
//! and structural validation.

pub mod extract;
pub mod normalize;
pub mod prompt;
pub mod validate;

pub use extract::extract_json;
pub use normalize::{DEFAULT_REMINDER, DEFAULT_TIPS, default_remarks, normalize_plan};
pub use prompt::{PLAN_SCHEMA, build_day_prompt, build_plan_prompt, build_suggestion_prompt};
pub use validate::{
    ActivitiesRule, TimeRepair, ValidatedPlan, check_day_structure, check_plan_structure,
    repair_day_times, repair_plan_times, validate_day, validate_plan,
};
