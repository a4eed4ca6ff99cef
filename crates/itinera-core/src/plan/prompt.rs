//! Prompt construction for itinerary generation.
//!
//! Pure functions: every builder turns trip parameters into a
//! [`PromptRequest`] and has no failure mode of its own.

use crate::itinerary::GenerationRequest;
use crate::model::PromptRequest;

// ---------------------------------------------------------------------------
// Schema references
// ---------------------------------------------------------------------------

/// JSON shape of a full plan, embedded in the system prompt.
pub const PLAN_SCHEMA: &str = r#"{
  "title": "Trip to [Destination]",
  "destination": "Destination name",
  "remarks": "Brief overview of the trip",
  "days": [
    {
      "day_number": 1,
      "description": "Brief description of the day",
      "reminder": "Important reminders for the day",
      "activities": [
        {
          "location": "Location name",
          "activity": "Description of the activity",
          "tips": "Useful tips",
          "start_at": "09:00",
          "end_at": "11:00"
        }
      ]
    }
  ],
  "tips": ["Tip1", "Tip2"]
}"#;

/// Closing instruction shared by every structured prompt.
const NO_WRAPPING: &str =
    "DO NOT include any markdown formatting, indentation, or explanations outside the JSON.";

/// JSON shape of a single day, with the target day number filled in.
fn day_schema(day_number: u32) -> String {
    format!(
        r#"{{
  "day_number": {day_number},
  "description": "Brief description of the day",
  "reminder": "Important reminders for the day",
  "activities": [
    {{
      "location": "Location name",
      "activity": "Description of the activity",
      "tips": "Useful tips",
      "start_at": "09:00",
      "end_at": "11:00"
    }}
  ]
}}"#
    )
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Build the full-plan prompt for a generation request.
pub fn build_plan_prompt(request: &GenerationRequest) -> PromptRequest {
    let mut system = String::with_capacity(2048);

    system.push_str(
        "You are an expert travel planner. Create a travel itinerary as a JSON object.\n",
    );
    system.push_str("Return a VALID JSON object with this structure:\n");
    system.push_str(PLAN_SCHEMA);
    system.push_str("\n\nImportant formatting requirements:\n");
    system.push_str(
        "1. The \"start_at\" and \"end_at\" fields must be in 24-hour format (HH:MM)\n",
    );
    system.push_str("2. The \"day_number\" must be sequential integers starting from 1\n");
    system.push_str(&format!(
        "3. The \"days\" array must contain exactly {} entries\n",
        request.duration
    ));
    system.push_str("4. Include a descriptive title for the trip\n");
    system.push_str("5. Include detailed descriptions and reminders for each day\n");
    system.push_str("6. Provide specific tips for each activity\n\n");
    system.push_str(NO_WRAPPING);

    let user = format!(
        "Plan a {}-day trip to {}. Consider that I'm interested in {}.",
        request.duration, request.destination, request.interests
    );

    PromptRequest { system, user }
}

/// Build the prompt for regenerating one day of an existing plan.
pub fn build_day_prompt(day_number: u32, destination: &str, interests: &str) -> PromptRequest {
    let mut system = String::with_capacity(1024);

    system.push_str(&format!(
        "You are an expert travel planner. Create a single day itinerary for day {day_number} of a trip to {destination}.\n"
    ));
    system.push_str("Return a VALID JSON object for a single day with this structure:\n");
    system.push_str(&day_schema(day_number));
    system.push_str("\n\nImportant formatting requirements:\n");
    system.push_str(
        "1. The \"start_at\" and \"end_at\" fields must be in 24-hour format (HH:MM)\n",
    );
    system.push_str("2. Include detailed descriptions and reminders for the day\n");
    system.push_str("3. Provide specific tips for each activity\n\n");
    system.push_str(NO_WRAPPING);

    let user = format!(
        "Create a day plan for day {day_number} of a trip to {destination}. Consider that I'm interested in {interests}."
    );

    PromptRequest { system, user }
}

/// Build the free-text travel advisor prompt.
pub fn build_suggestion_prompt(destination: &str, query: &str) -> PromptRequest {
    PromptRequest {
        system: "You are a knowledgeable travel advisor. Provide specific, accurate information about destinations.".to_string(),
        user: format!("Regarding {destination}: {query}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kyoto() -> GenerationRequest {
        GenerationRequest::new("Kyoto, Japan", 2, Some("temples and food")).unwrap()
    }

    #[test]
    fn plan_prompt_embeds_schema_and_rules() {
        let prompt = build_plan_prompt(&kyoto());
        assert!(prompt.system.contains("\"day_number\": 1"));
        assert!(prompt.system.contains("\"start_at\": \"09:00\""));
        assert!(prompt.system.contains("24-hour format (HH:MM)"));
        assert!(prompt.system.contains("sequential integers starting from 1"));
        assert!(prompt.system.contains("DO NOT include any markdown"));
    }

    #[test]
    fn plan_prompt_states_day_count() {
        let prompt = build_plan_prompt(&kyoto());
        assert!(prompt.system.contains("exactly 2 entries"));
    }

    #[test]
    fn plan_prompt_user_carries_trip_parameters() {
        let prompt = build_plan_prompt(&kyoto());
        assert_eq!(
            prompt.user,
            "Plan a 2-day trip to Kyoto, Japan. Consider that I'm interested in temples and food."
        );
    }

    #[test]
    fn plan_schema_is_valid_json() {
        let value: serde_json::Value = serde_json::from_str(PLAN_SCHEMA).unwrap();
        assert!(value["days"].is_array());
    }

    #[test]
    fn day_prompt_is_scoped_to_one_day() {
        let prompt = build_day_prompt(3, "Oslo", "fjords");
        assert!(prompt.system.contains("single day itinerary for day 3 of a trip to Oslo"));
        assert!(prompt.system.contains("\"day_number\": 3"));
        assert!(!prompt.system.contains("\"days\""));
        assert!(prompt.user.contains("day 3"));
        assert!(prompt.user.contains("fjords"));
    }

    #[test]
    fn day_schema_is_valid_json() {
        let value: serde_json::Value = serde_json::from_str(&day_schema(4)).unwrap();
        assert_eq!(value["day_number"], 4);
    }

    #[test]
    fn suggestion_prompt_carries_destination_and_query() {
        let prompt = build_suggestion_prompt("Tokyo, Japan", "When is cherry blossom season?");
        assert!(prompt.system.contains("travel advisor"));
        assert_eq!(prompt.user, "Regarding Tokyo, Japan: When is cherry blossom season?");
    }
}
