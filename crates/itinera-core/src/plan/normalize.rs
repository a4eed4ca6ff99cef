//! Fill absent-but-required plan fields with deterministic defaults.
//!
//! The normalizer never fails. It works on the raw JSON candidate so that
//! legacy shapes (`summary`, `day`, combined `time`) can be folded into the
//! current schema before validation. A field holding `null` counts as
//! absent. Normalizing an already-normalized plan changes nothing.
//!
//! Calendar dates are derived from the request's start date, never taken
//! from the model, so any `date` the model writes on a day is dropped.

use serde_json::{Map, Value};

use crate::itinerary::{DEFAULT_END_AT, DEFAULT_START_AT, GenerationRequest};

/// Tips used when the model supplies none.
pub const DEFAULT_TIPS: [&str; 2] = [
    "Pack appropriate clothing for the weather",
    "Research local customs before your trip",
];

/// Reminder used for days the model left without one.
pub const DEFAULT_REMINDER: &str = "Check local weather forecast";

/// Normalize a candidate plan in place.
///
/// Non-object candidates, a non-array `days`, and non-object entries are
/// left untouched for the validator to report.
pub fn normalize_plan(candidate: &mut Value, request: &GenerationRequest) {
    let Some(plan) = candidate.as_object_mut() else {
        return;
    };

    if is_absent(plan, "title") {
        plan.insert(
            "title".into(),
            Value::String(format!("Trip to {}", request.destination)),
        );
    }
    if is_absent(plan, "destination") {
        plan.insert(
            "destination".into(),
            Value::String(request.destination.clone()),
        );
    }
    if is_absent(plan, "remarks") {
        let remarks = match plan.remove("summary") {
            Some(Value::String(summary)) => summary,
            _ => default_remarks(request),
        };
        plan.insert("remarks".into(), Value::String(remarks));
    }
    if is_absent(plan, "tips") {
        plan.insert(
            "tips".into(),
            Value::Array(DEFAULT_TIPS.iter().map(|t| Value::from(*t)).collect()),
        );
    }

    if let Some(Value::Array(days)) = plan.get_mut("days") {
        for (position, day) in days.iter_mut().enumerate() {
            if let Some(day) = day.as_object_mut() {
                normalize_day(day, position + 1);
            }
        }
    }
}

/// `"A {duration}-day trip to {destination} focusing on {interests}"`.
pub fn default_remarks(request: &GenerationRequest) -> String {
    format!(
        "A {}-day trip to {} focusing on {}",
        request.duration, request.destination, request.interests
    )
}

fn normalize_day(day: &mut Map<String, Value>, position: usize) {
    day.remove("date");

    if is_absent(day, "day_number") {
        let legacy = day.get("day").filter(|v| v.is_u64()).cloned();
        if legacy.is_some() {
            day.remove("day");
        }
        day.insert(
            "day_number".into(),
            legacy.unwrap_or_else(|| Value::from(position)),
        );
    }

    let label = match day.get("day_number") {
        Some(Value::Number(n)) => n.to_string(),
        _ => position.to_string(),
    };
    if is_absent(day, "description") {
        day.insert(
            "description".into(),
            Value::String(format!("Day {label} exploration")),
        );
    }
    if is_absent(day, "reminder") {
        day.insert("reminder".into(), Value::from(DEFAULT_REMINDER));
    }

    if let Some(Value::Array(activities)) = day.get_mut("activities") {
        for activity in activities.iter_mut().filter_map(Value::as_object_mut) {
            normalize_activity_times(activity);
        }
    }
}

/// Fill absent `start_at`/`end_at` from a legacy `"HH:MM-HH:MM"` `time`
/// field, or from the defaults, and drop `time`.
fn normalize_activity_times(activity: &mut Map<String, Value>) {
    let legacy = activity.remove("time");
    let missing_start = is_absent(activity, "start_at");
    let missing_end = is_absent(activity, "end_at");
    if !missing_start && !missing_end {
        return;
    }

    let (start, end) = legacy
        .as_ref()
        .and_then(Value::as_str)
        .and_then(split_time_range)
        .unwrap_or((DEFAULT_START_AT.to_string(), DEFAULT_END_AT.to_string()));

    if missing_start {
        activity.insert("start_at".into(), Value::String(start));
    }
    if missing_end {
        activity.insert("end_at".into(), Value::String(end));
    }
}

/// Split `"09:00-11:00"` into its two halves. Anything other than exactly
/// two dash-separated parts yields `None`.
fn split_time_range(range: &str) -> Option<(String, String)> {
    let mut parts = range.split('-');
    let (start, end) = (parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    Some((start.trim().to_string(), end.trim().to_string()))
}

fn is_absent(map: &Map<String, Value>, key: &str) -> bool {
    map.get(key).is_none_or(Value::is_null)
}
