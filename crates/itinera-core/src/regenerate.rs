//! Single-day regeneration for an existing plan.
//!
//! One model call, no retries. The caller always gets a plan back; the
//! [`RegenerationStatus`] says whether it changed.

use serde::Serialize;
use serde_json::Value;

use crate::error::StepError;
use crate::itinerary::{Day, TravelPlan};
use crate::model::ModelClient;
use crate::plan::{ActivitiesRule, build_day_prompt, extract_json, validate_day};

/// What happened to the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RegenerationStatus {
    /// An existing day with the target number was replaced.
    Replaced,
    /// No day had the target number; the new day was appended and the days
    /// re-sorted.
    Appended,
    /// Regeneration failed; the plan is the input plan.
    Unchanged { reason: String },
}

/// Result of [`regenerate_day`].
#[derive(Debug, Clone, Serialize)]
pub struct DayRegeneration {
    pub plan: TravelPlan,
    #[serde(flatten)]
    pub status: RegenerationStatus,
}

impl DayRegeneration {
    pub fn changed(&self) -> bool {
        !matches!(self.status, RegenerationStatus::Unchanged { .. })
    }
}

/// Regenerate day `day_number` of `plan`.
pub async fn regenerate_day(
    client: &dyn ModelClient,
    plan: &TravelPlan,
    day_number: u32,
    destination: &str,
    interests: &str,
) -> DayRegeneration {
    if day_number == 0 {
        tracing::warn!(day_number, "day numbers start at 1, keeping plan");
        return DayRegeneration {
            plan: plan.clone(),
            status: RegenerationStatus::Unchanged {
                reason: "day numbers start at 1".to_string(),
            },
        };
    }

    match request_day(client, day_number, destination, interests).await {
        Ok(day) => {
            let (plan, status) = splice_day(plan, day);
            tracing::info!(day_number, status = ?status, "regenerated day");
            DayRegeneration { plan, status }
        }
        Err(e) => {
            tracing::warn!(day_number, error = %e, "day regeneration failed, keeping plan");
            DayRegeneration {
                plan: plan.clone(),
                status: RegenerationStatus::Unchanged {
                    reason: e.to_string(),
                },
            }
        }
    }
}

async fn request_day(
    client: &dyn ModelClient,
    day_number: u32,
    destination: &str,
    interests: &str,
) -> Result<Day, StepError> {
    let prompt = build_day_prompt(day_number, destination, interests);
    let raw = client.generate(&prompt).await?;
    let mut candidate = extract_json(&raw)?;

    // Dates come from the plan, and the day number from the request.
    if let Some(day) = candidate.as_object_mut() {
        day.remove("date");
        if day.contains_key("day_number") {
            day.insert("day_number".into(), Value::from(day_number));
        }
    }

    let (day, repairs) = validate_day(&mut candidate, ActivitiesRule::RequireNonEmpty)?;
    if !repairs.is_empty() {
        tracing::debug!(day_number, repairs = repairs.len(), "reset invalid activity times");
    }
    Ok(day)
}

fn splice_day(plan: &TravelPlan, mut day: Day) -> (TravelPlan, RegenerationStatus) {
    let mut plan = plan.clone();
    match plan.days.iter_mut().find(|d| d.day_number == day.day_number) {
        Some(existing) => {
            day.date = existing.date;
            *existing = day;
            (plan, RegenerationStatus::Replaced)
        }
        None => {
            plan.days.push(day);
            plan.days.sort_by_key(|d| d.day_number);
            (plan, RegenerationStatus::Appended)
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use crate::error::ModelError;
    use crate::itinerary::Activity;
    use crate::model::PromptRequest;

    struct Fixed(Result<String, String>);

    #[async_trait]
    impl ModelClient for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn generate(&self, _prompt: &PromptRequest) -> Result<String, ModelError> {
            self.0.clone().map_err(ModelError::Other)
        }
    }

    fn day(n: u32, description: &str) -> Day {
        Day {
            day_number: n,
            description: description.to_string(),
            reminder: "r".to_string(),
            activities: vec![Activity {
                location: "l".into(),
                activity: "a".into(),
                tips: "t".into(),
                start_at: "09:00".into(),
                end_at: "10:00".into(),
            }],
            date: None,
        }
    }

    fn plan(numbers: &[u32]) -> TravelPlan {
        TravelPlan {
            title: "Kyoto".into(),
            destination: "Kyoto, Japan".into(),
            remarks: "r".into(),
            days: numbers.iter().map(|&n| day(n, "original")).collect(),
            tips: vec![],
        }
    }

    fn day_response(n: u32) -> String {
        json!({
            "day_number": n,
            "description": "Fresh day",
            "reminder": "Book ahead",
            "activities": [{
                "location": "Arashiyama",
                "activity": "Bamboo grove",
                "tips": "Early",
                "start_at": "07:00",
                "end_at": "99:00"
            }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn replaces_only_the_target_day() {
        let original = plan(&[1, 2, 3]);
        let client = Fixed(Ok(day_response(2)));
        let result = regenerate_day(&client, &original, 2, "Kyoto", "temples").await;

        assert_eq!(result.status, RegenerationStatus::Replaced);
        assert_eq!(result.plan.days[0], original.days[0]);
        assert_eq!(result.plan.days[2], original.days[2]);
        assert_eq!(result.plan.days[1].description, "Fresh day");
        // Invalid end time is reset with its pair.
        assert_eq!(result.plan.days[1].activities[0].start_at, "09:00");
        assert_eq!(result.plan.days[1].activities[0].end_at, "11:00");
    }

    #[tokio::test]
    async fn model_failure_leaves_plan_unchanged() {
        let original = plan(&[1, 2, 3]);
        let client = Fixed(Err("down".into()));
        let result = regenerate_day(&client, &original, 2, "Kyoto", "temples").await;

        assert_eq!(result.plan, original);
        assert!(!result.changed());
        assert_eq!(
            result.status,
            RegenerationStatus::Unchanged {
                reason: "model unavailable: down".into()
            }
        );
    }

    #[tokio::test]
    async fn empty_activities_are_rejected() {
        let original = plan(&[1, 2]);
        let raw = json!({
            "day_number": 1, "description": "d", "reminder": "r", "activities": []
        })
        .to_string();
        let result = regenerate_day(&Fixed(Ok(raw)), &original, 1, "Kyoto", "temples").await;

        assert_eq!(result.plan, original);
        assert!(!result.changed());
    }

    #[tokio::test]
    async fn missing_day_is_appended_in_order() {
        let original = plan(&[1, 3]);
        let result = regenerate_day(&Fixed(Ok(day_response(2))), &original, 2, "Kyoto", "x").await;

        assert_eq!(result.status, RegenerationStatus::Appended);
        let numbers: Vec<u32> = result.plan.days.iter().map(|d| d.day_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn day_number_is_forced_to_target_and_date_kept() {
        let mut original = plan(&[1, 2]);
        let date = NaiveDate::from_ymd_opt(2026, 5, 2).unwrap();
        original.days[1].date = Some(date);

        // Model answers with the wrong number.
        let result = regenerate_day(&Fixed(Ok(day_response(7))), &original, 2, "Kyoto", "x").await;

        assert_eq!(result.status, RegenerationStatus::Replaced);
        assert_eq!(result.plan.days.len(), 2);
        assert_eq!(result.plan.days[1].day_number, 2);
        assert_eq!(result.plan.days[1].date, Some(date));
    }

    #[test]
    fn status_serializes_with_tag() {
        let value = serde_json::to_value(RegenerationStatus::Unchanged {
            reason: "boom".into(),
        })
        .unwrap();
        assert_eq!(value, json!({ "status": "unchanged", "reason": "boom" }));
    }
}
