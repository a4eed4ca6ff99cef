//! Structural validation of normalized plans.
//!
//! Validation runs as two explicit passes over the JSON candidate:
//! - **check** reports the first missing required field (or wrong shape) as
//!   a [`PlanStructureError`];
//! - **repair** resets activity times that are not valid `HH:MM` to the
//!   default pair and records each reset as a [`TimeRepair`]. Valid times
//!   with a one-digit hour are zero-padded in place. Repairs are never
//!   errors.
//!
//! The checked and repaired value is then decoded into the typed
//! [`TravelPlan`] / [`Day`].

use serde::Serialize;
use serde_json::Value;

use crate::error::PlanStructureError;
use crate::itinerary::{
    DEFAULT_END_AT, DEFAULT_START_AT, Day, TravelPlan, format_wall_clock, parse_wall_clock,
};

const PLAN_FIELDS: [&str; 5] = ["title", "destination", "remarks", "days", "tips"];
const DAY_FIELDS: [&str; 4] = ["day_number", "description", "reminder", "activities"];
const ACTIVITY_FIELDS: [&str; 5] = ["location", "activity", "tips", "start_at", "end_at"];

/// An activity whose time window was reset to the default pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeRepair {
    /// 1-based position of the day within the plan.
    pub day_position: usize,
    /// 0-based index of the activity within its day.
    pub activity_index: usize,
    /// `start_at` as the model wrote it, rendered as JSON.
    pub original_start_at: String,
    /// `end_at` as the model wrote it, rendered as JSON.
    pub original_end_at: String,
}

/// Output of a successful validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPlan {
    pub plan: TravelPlan,
    pub repairs: Vec<TimeRepair>,
}

/// How strictly a single day's activities are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivitiesRule {
    /// `activities` must be an array; it may be empty.
    AllowEmpty,
    /// `activities` must be a non-empty array.
    RequireNonEmpty,
}

// ---------------------------------------------------------------------------
// Full plan
// ---------------------------------------------------------------------------

/// Check, repair, and decode a full plan.
///
/// When `expected_days` is given, the plan must contain exactly that many
/// days.
pub fn validate_plan(
    candidate: &mut Value,
    expected_days: Option<u32>,
) -> Result<ValidatedPlan, PlanStructureError> {
    check_plan_structure(candidate, expected_days)?;
    let repairs = repair_plan_times(candidate);
    let plan: TravelPlan = serde_json::from_value(candidate.clone())?;
    Ok(ValidatedPlan { plan, repairs })
}

/// The check pass for a full plan. Does not modify the candidate.
pub fn check_plan_structure(
    candidate: &Value,
    expected_days: Option<u32>,
) -> Result<(), PlanStructureError> {
    let plan = candidate
        .as_object()
        .ok_or(PlanStructureError::NotAnObject("Travel plan"))?;

    for field in PLAN_FIELDS {
        if plan.get(field).is_none_or(Value::is_null) {
            return Err(PlanStructureError::MissingPlanField(field));
        }
    }

    let days = match plan.get("days") {
        Some(Value::Array(days)) if !days.is_empty() => days,
        _ => return Err(PlanStructureError::EmptyDays),
    };

    for day in days {
        check_day_structure(day, ActivitiesRule::AllowEmpty)?;
    }

    if let Some(expected) = expected_days {
        if days.len() != expected as usize {
            return Err(PlanStructureError::DayCountMismatch {
                expected,
                actual: days.len(),
            });
        }
    }

    for (index, day) in days.iter().enumerate() {
        let position = index + 1;
        if let Some(found) = day.get("day_number").and_then(Value::as_i64) {
            if found != position as i64 {
                return Err(PlanStructureError::DayNumberOutOfSequence { position, found });
            }
        }
    }

    Ok(())
}

/// The repair pass for a full plan. Returns every reset performed.
pub fn repair_plan_times(candidate: &mut Value) -> Vec<TimeRepair> {
    let mut repairs = Vec::new();
    if let Some(Value::Array(days)) = candidate.get_mut("days") {
        for (index, day) in days.iter_mut().enumerate() {
            repairs.extend(repair_day_times(day, index + 1));
        }
    }
    repairs
}

// ---------------------------------------------------------------------------
// Single day
// ---------------------------------------------------------------------------

/// Check, repair, and decode a single day.
pub fn validate_day(
    candidate: &mut Value,
    rule: ActivitiesRule,
) -> Result<(Day, Vec<TimeRepair>), PlanStructureError> {
    check_day_structure(candidate, rule)?;
    let repairs = repair_day_times(candidate, 1);
    let day: Day = serde_json::from_value(candidate.clone())?;
    Ok((day, repairs))
}

/// The check pass for one day and its activities.
pub fn check_day_structure(day: &Value, rule: ActivitiesRule) -> Result<(), PlanStructureError> {
    let day = day.as_object().ok_or(PlanStructureError::NotAnObject("Day"))?;

    for field in DAY_FIELDS {
        if day.get(field).is_none_or(Value::is_null) {
            return Err(PlanStructureError::MissingDayField(field));
        }
    }

    let activities = day
        .get("activities")
        .and_then(Value::as_array)
        .ok_or(PlanStructureError::ActivitiesNotList)?;
    if rule == ActivitiesRule::RequireNonEmpty && activities.is_empty() {
        return Err(PlanStructureError::EmptyActivities);
    }

    for activity in activities {
        let activity = activity
            .as_object()
            .ok_or(PlanStructureError::NotAnObject("Activity"))?;
        for field in ACTIVITY_FIELDS {
            if activity.get(field).is_none_or(Value::is_null) {
                return Err(PlanStructureError::MissingActivityField(field));
            }
        }
    }

    Ok(())
}

/// The repair pass for one day. `day_position` is only used to label the
/// repairs.
pub fn repair_day_times(day: &mut Value, day_position: usize) -> Vec<TimeRepair> {
    let Some(Value::Array(activities)) = day.get_mut("activities") else {
        return Vec::new();
    };

    let mut repairs = Vec::new();
    for (activity_index, activity) in activities.iter_mut().enumerate() {
        let Some(activity) = activity.as_object_mut() else {
            continue;
        };
        let start = activity.get("start_at").cloned().unwrap_or(Value::Null);
        let end = activity.get("end_at").cloned().unwrap_or(Value::Null);
        if let (Some(start_at), Some(end_at)) = (wall_clock(&start), wall_clock(&end)) {
            activity.insert("start_at".into(), Value::from(format_wall_clock(start_at)));
            activity.insert("end_at".into(), Value::from(format_wall_clock(end_at)));
            continue;
        }

        activity.insert("start_at".into(), Value::from(DEFAULT_START_AT));
        activity.insert("end_at".into(), Value::from(DEFAULT_END_AT));
        repairs.push(TimeRepair {
            day_position,
            activity_index,
            original_start_at: start.to_string(),
            original_end_at: end.to_string(),
        });
    }
    repairs
}

fn wall_clock(value: &Value) -> Option<(u8, u8)> {
    value.as_str().and_then(parse_wall_clock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn activity(start: &str, end: &str) -> Value {
        json!({
            "location": "Kinkaku-ji",
            "activity": "Visit the Golden Pavilion",
            "tips": "Arrive at opening",
            "start_at": start,
            "end_at": end
        })
    }

    fn day(n: u32, activities: Vec<Value>) -> Value {
        json!({
            "day_number": n,
            "description": format!("Day {n}"),
            "reminder": "Bring water",
            "activities": activities
        })
    }

    fn plan(days: Vec<Value>) -> Value {
        json!({
            "title": "Kyoto",
            "destination": "Kyoto, Japan",
            "remarks": "Temples",
            "days": days,
            "tips": ["Carry cash"]
        })
    }

    #[test]
    fn accepts_well_formed_plan() {
        let mut candidate = plan(vec![
            day(1, vec![activity("09:00", "11:00")]),
            day(2, vec![activity("13:30", "15:00")]),
        ]);
        let validated = validate_plan(&mut candidate, Some(2)).unwrap();
        assert_eq!(validated.plan.days.len(), 2);
        assert_eq!(validated.plan.days[1].activities[0].start_at, "13:30");
        assert!(validated.repairs.is_empty());
    }

    #[test]
    fn names_missing_plan_field() {
        for field in PLAN_FIELDS {
            let mut candidate = plan(vec![day(1, vec![])]);
            candidate.as_object_mut().unwrap().remove(field);
            let err = validate_plan(&mut candidate, None).unwrap_err();
            assert!(
                matches!(err, PlanStructureError::MissingPlanField(f) if f == field),
                "expected missing {field}, got: {err}"
            );
        }
    }

    #[test]
    fn rejects_empty_or_non_list_days() {
        let mut candidate = plan(vec![]);
        let err = validate_plan(&mut candidate, None).unwrap_err();
        assert!(matches!(err, PlanStructureError::EmptyDays), "got: {err}");

        let mut candidate = plan(vec![]);
        candidate["days"] = json!("three days");
        let err = validate_plan(&mut candidate, None).unwrap_err();
        assert!(matches!(err, PlanStructureError::EmptyDays), "got: {err}");
    }

    #[test]
    fn names_missing_day_field() {
        let mut d = day(1, vec![]);
        d.as_object_mut().unwrap().remove("reminder");
        let mut candidate = plan(vec![d]);
        let err = validate_plan(&mut candidate, None).unwrap_err();
        assert_eq!(err.to_string(), "Day is missing required field: reminder");
    }

    #[test]
    fn activities_must_be_a_list() {
        let mut d = day(1, vec![]);
        d["activities"] = json!({ "location": "x" });
        let mut candidate = plan(vec![d]);
        let err = validate_plan(&mut candidate, None).unwrap_err();
        assert!(matches!(err, PlanStructureError::ActivitiesNotList), "got: {err}");
    }

    #[test]
    fn empty_activities_allowed_in_full_plan() {
        let mut candidate = plan(vec![day(1, vec![])]);
        assert!(validate_plan(&mut candidate, Some(1)).is_ok());
    }

    #[test]
    fn names_missing_activity_field() {
        let mut a = activity("09:00", "10:00");
        a.as_object_mut().unwrap().remove("tips");
        let mut candidate = plan(vec![day(1, vec![a])]);
        let err = validate_plan(&mut candidate, None).unwrap_err();
        assert_eq!(err.to_string(), "Activity is missing required field: tips");
    }

    #[test]
    fn invalid_time_is_repaired_not_rejected() {
        let mut candidate = plan(vec![day(1, vec![activity("25:99", "12:00")])]);
        let validated = validate_plan(&mut candidate, Some(1)).unwrap();

        let a = &validated.plan.days[0].activities[0];
        assert_eq!(a.start_at, "09:00");
        assert_eq!(a.end_at, "11:00");
        assert_eq!(
            validated.repairs,
            vec![TimeRepair {
                day_position: 1,
                activity_index: 0,
                original_start_at: "\"25:99\"".to_string(),
                original_end_at: "\"12:00\"".to_string(),
            }]
        );
        // The candidate itself carries the repair.
        assert_eq!(candidate["days"][0]["activities"][0]["start_at"], "09:00");
    }

    #[test]
    fn non_string_time_is_repaired() {
        let mut a = activity("09:00", "10:00");
        a["end_at"] = json!(1030);
        let mut candidate = plan(vec![day(1, vec![a])]);
        let validated = validate_plan(&mut candidate, None).unwrap();
        assert_eq!(validated.plan.days[0].activities[0].end_at, "11:00");
        assert_eq!(validated.repairs.len(), 1);
    }

    #[test]
    fn padded_or_short_minute_times_are_reset() {
        let mut candidate = plan(vec![day(
            1,
            vec![activity(" 09:00", "10:00"), activity("9:5", "10:00")],
        )]);
        let validated = validate_plan(&mut candidate, Some(1)).unwrap();

        assert_eq!(validated.repairs.len(), 2);
        for a in &validated.plan.days[0].activities {
            assert_eq!((a.start_at.as_str(), a.end_at.as_str()), ("09:00", "11:00"));
        }
    }

    #[test]
    fn one_digit_hours_are_zero_padded_silently() {
        let mut candidate = plan(vec![day(1, vec![activity("9:30", "13:05")])]);
        let validated = validate_plan(&mut candidate, Some(1)).unwrap();

        assert!(validated.repairs.is_empty());
        let a = &validated.plan.days[0].activities[0];
        assert_eq!(a.start_at, "09:30");
        assert_eq!(a.end_at, "13:05");
    }

    #[test]
    fn check_pass_does_not_repair() {
        let candidate = plan(vec![day(1, vec![activity("noon", "later")])]);
        let before = candidate.clone();
        check_plan_structure(&candidate, None).unwrap();
        assert_eq!(candidate, before);
    }

    #[test]
    fn day_count_mismatch_is_a_structure_error() {
        let mut candidate = plan(vec![day(1, vec![]), day(2, vec![]), day(3, vec![])]);
        let err = validate_plan(&mut candidate, Some(2)).unwrap_err();
        assert!(
            matches!(err, PlanStructureError::DayCountMismatch { expected: 2, actual: 3 }),
            "got: {err}"
        );
        // Without an expectation the same plan passes.
        assert!(validate_plan(&mut candidate, None).is_ok());
    }

    #[test]
    fn day_numbers_must_follow_position() {
        let mut candidate = plan(vec![day(1, vec![]), day(3, vec![])]);
        let err = validate_plan(&mut candidate, None).unwrap_err();
        assert!(
            matches!(err, PlanStructureError::DayNumberOutOfSequence { position: 2, found: 3 }),
            "got: {err}"
        );
    }

    #[test]
    fn wrong_value_type_is_a_structure_error() {
        let mut candidate = plan(vec![day(1, vec![])]);
        candidate["title"] = json!(42);
        let err = validate_plan(&mut candidate, None).unwrap_err();
        assert!(matches!(err, PlanStructureError::InvalidValue(_)), "got: {err}");
    }

    #[test]
    fn single_day_requires_non_empty_activities() {
        let mut candidate = day(2, vec![]);
        let err = validate_day(&mut candidate, ActivitiesRule::RequireNonEmpty).unwrap_err();
        assert!(matches!(err, PlanStructureError::EmptyActivities), "got: {err}");

        let mut candidate = day(2, vec![activity("08:00", "31:00")]);
        let (d, repairs) = validate_day(&mut candidate, ActivitiesRule::RequireNonEmpty).unwrap();
        assert_eq!(d.day_number, 2);
        assert_eq!(d.activities[0].start_at, "09:00");
        assert_eq!(d.activities[0].end_at, "11:00");
        assert_eq!(repairs.len(), 1);
    }

    #[test]
    fn non_object_entries_are_rejected() {
        let mut candidate = plan(vec![json!("day one")]);
        let err = validate_plan(&mut candidate, None).unwrap_err();
        assert_eq!(err.to_string(), "Day must be a JSON object");

        let mut candidate = plan(vec![day(1, vec![json!(7)])]);
        let err = validate_plan(&mut candidate, None).unwrap_err();
        assert_eq!(err.to_string(), "Activity must be a JSON object");
    }
}
