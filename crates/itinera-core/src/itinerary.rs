//! Itinerary data model: the generation request and the validated plan types.
//!
//! These types map directly to the JSON shape the model is asked to produce
//! and are (de)serialized via `serde`, so a web layer can accept and return
//! them unchanged.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::RequestError;

/// Interests used when the caller does not supply any.
pub const DEFAULT_INTERESTS: &str = "general sightseeing and local culture";

/// Default activity start time applied when a time is absent or invalid.
pub const DEFAULT_START_AT: &str = "09:00";

/// Default activity end time applied when a time is absent or invalid.
pub const DEFAULT_END_AT: &str = "11:00";

fn default_interests() -> String {
    DEFAULT_INTERESTS.to_string()
}

/// Input to a single generation run.
///
/// Deserialization enforces the same invariants as [`GenerationRequest::new`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RequestFields")]
pub struct GenerationRequest {
    /// Destination city and country (e.g. "Kyoto, Japan").
    pub destination: String,
    /// Trip length in days. Always at least 1.
    pub duration: u32,
    /// Free-text interests to steer the itinerary.
    pub interests: String,
    /// Optional first day of the trip, used to date each day of the plan.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

impl GenerationRequest {
    /// Build a validated request. Blank interests fall back to
    /// [`DEFAULT_INTERESTS`].
    pub fn new(
        destination: impl Into<String>,
        duration: u32,
        interests: Option<&str>,
    ) -> Result<Self, RequestError> {
        let interests = match interests.map(str::trim) {
            Some(i) if !i.is_empty() => i.to_string(),
            _ => default_interests(),
        };
        let request = Self {
            destination: destination.into().trim().to_string(),
            duration,
            interests,
            start_date: None,
        };
        request.validate()?;
        Ok(request)
    }

    /// Attach a start date.
    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// Check the request invariants. Deserialized requests should be
    /// validated before use.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.destination.trim().is_empty() {
            return Err(RequestError::EmptyDestination);
        }
        if self.duration == 0 {
            return Err(RequestError::ZeroDuration);
        }
        Ok(())
    }
}

/// Wire shape of [`GenerationRequest`], checked on conversion.
#[derive(Deserialize)]
struct RequestFields {
    destination: String,
    duration: u32,
    #[serde(default)]
    interests: Option<String>,
    #[serde(default)]
    start_date: Option<NaiveDate>,
}

impl TryFrom<RequestFields> for GenerationRequest {
    type Error = RequestError;

    fn try_from(fields: RequestFields) -> Result<Self, Self::Error> {
        let request = Self::new(fields.destination, fields.duration, fields.interests.as_deref())?;
        Ok(match fields.start_date {
            Some(start) => request.with_start_date(start),
            None => request,
        })
    }
}

/// A complete multi-day itinerary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TravelPlan {
    pub title: String,
    pub destination: String,
    /// Brief overview of the trip.
    pub remarks: String,
    /// Days in order; `days[i].day_number == i + 1` for validated plans.
    pub days: Vec<Day>,
    pub tips: Vec<String>,
}

impl TravelPlan {
    /// Look up a day by its `day_number`.
    pub fn day(&self, day_number: u32) -> Option<&Day> {
        self.days.iter().find(|d| d.day_number == day_number)
    }

    /// Date every day relative to `start_date` (day 1 falls on `start_date`).
    ///
    /// Days whose date would overflow the calendar are left undated.
    pub fn apply_start_date(&mut self, start_date: NaiveDate) {
        for day in &mut self.days {
            let offset = u64::from(day.day_number.saturating_sub(1));
            day.date = start_date.checked_add_days(Days::new(offset));
        }
    }
}

/// One day of a plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Day {
    pub day_number: u32,
    pub description: String,
    /// Important reminders for the day.
    pub reminder: String,
    pub activities: Vec<Activity>,
    /// Calendar date, present only when the request carried a start date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// One scheduled item within a day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Activity {
    pub location: String,
    /// Description of the activity.
    pub activity: String,
    pub tips: String,
    /// Start time, `HH:MM` 24-hour.
    pub start_at: String,
    /// End time, `HH:MM` 24-hour.
    pub end_at: String,
}

/// Parse a 24-hour wall-clock time with hour in `0..=23` and minute in
/// `0..=59`. The hour may be one digit (the model sometimes writes `9:00`);
/// the minute must be two. Surrounding whitespace is not accepted.
pub fn parse_wall_clock(value: &str) -> Option<(u8, u8)> {
    let (hour, minute) = value.split_once(':')?;
    let digits = |part: &str, widths: &[usize]| -> Option<u8> {
        if !widths.contains(&part.len()) || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        part.parse().ok()
    };
    let (hour, minute) = (digits(hour, &[1, 2])?, digits(minute, &[2])?);
    (hour <= 23 && minute <= 59).then_some((hour, minute))
}

/// Render a parsed time as zero-padded `HH:MM`.
pub fn format_wall_clock((hour, minute): (u8, u8)) -> String {
    format!("{hour:02}:{minute:02}")
}
