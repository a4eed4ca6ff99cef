//! Shared test utilities for itinera integration tests.
//!
//! Provides a scripted [`ModelClient`] double that replays canned responses
//! and records every prompt it receives, plus builders for the JSON shapes
//! the model is expected to return.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};

use itinera_core::{ModelClient, ModelError, PromptRequest};

/// One scripted model reply.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Return this text.
    Text(String),
    /// Fail with `ModelError::Other(message)`.
    Fail(String),
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Reply::Fail(message.into())
    }
}

/// Replays [`Reply`]s in order. Once the script is down to its last reply,
/// that reply repeats forever.
pub struct ScriptedModelClient {
    script: Mutex<VecDeque<Reply>>,
    prompts: Mutex<Vec<PromptRequest>>,
    calls: AtomicUsize,
}

impl ScriptedModelClient {
    /// # Panics
    ///
    /// Panics if `script` is empty.
    pub fn new(script: Vec<Reply>) -> Self {
        assert!(!script.is_empty(), "script must have at least one reply");
        Self {
            script: Mutex::new(script.into()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always answer with `reply`.
    pub fn always(reply: Reply) -> Self {
        Self::new(vec![reply])
    }

    /// Number of `generate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every prompt received, in order.
    pub fn prompts(&self) -> Vec<PromptRequest> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedModelClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &PromptRequest) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.clone());

        let reply = {
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                script.front().cloned().unwrap()
            }
        };
        match reply {
            Reply::Text(text) => Ok(text),
            Reply::Fail(message) => Err(ModelError::Other(message)),
        }
    }
}

// ---------------------------------------------------------------------------
// Canned model output
// ---------------------------------------------------------------------------

/// One well-formed day object.
pub fn day_value(day_number: u32) -> Value {
    json!({
        "day_number": day_number,
        "description": format!("Day {day_number} highlights"),
        "reminder": "Carry a refillable water bottle",
        "activities": [
            {
                "location": "Old Town",
                "activity": "Guided walking tour",
                "tips": "Book the morning slot",
                "start_at": "09:30",
                "end_at": "11:30"
            },
            {
                "location": "Central Market",
                "activity": "Lunch at the food stalls",
                "tips": "Bring small change",
                "start_at": "12:00",
                "end_at": "13:30"
            }
        ]
    })
}

/// A complete plan object with `days` sequential days.
pub fn plan_value(destination: &str, days: u32) -> Value {
    json!({
        "title": format!("Discovering {destination}"),
        "destination": destination,
        "remarks": format!("{days} days in {destination}"),
        "days": (1..=days).map(day_value).collect::<Vec<_>>(),
        "tips": ["Buy a transit pass", "Learn a few local phrases"]
    })
}

/// A well-formed plan serialized as the model would return it.
pub fn well_formed_plan_json(destination: &str, days: u32) -> String {
    plan_value(destination, days).to_string()
}

/// A well-formed plan wrapped in chatty commentary and a code fence.
pub fn chatty_plan_json(destination: &str, days: u32) -> String {
    format!(
        "Here is your itinerary!\n```json\n{}\n```\nHave a great trip.",
        serde_json::to_string_pretty(&plan_value(destination, days)).unwrap()
    )
}

/// A plan in the legacy shape: `summary` instead of `remarks`, `day`
/// instead of `day_number`, and a combined `time` range on activities.
pub fn legacy_plan_json(destination: &str, days: u32) -> String {
    let days: Vec<Value> = (1..=days)
        .map(|n| {
            json!({
                "day": n,
                "activities": [{
                    "location": "Harbour",
                    "activity": "Boat ride",
                    "tips": "Sit on the left",
                    "time": "14:00-15:30"
                }]
            })
        })
        .collect();
    json!({
        "title": format!("{destination} classic"),
        "destination": destination,
        "summary": "An older-format plan",
        "days": days,
        "tips": []
    })
    .to_string()
}

/// A single day serialized as the model would return it.
pub fn day_json(day_number: u32) -> String {
    day_value(day_number).to_string()
}
