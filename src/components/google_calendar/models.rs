use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar event payload sent to the events insert endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDescriptor {
    pub summary: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub original_start_time: EventDateTime,
}

/// Start or end of an event
///
/// `time_zone` is the configured target timezone and need not match the
/// offset carried by `date_time`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date: NaiveDate,
    pub date_time: DateTime<FixedOffset>,
    pub time_zone: String,
}

impl EventDateTime {
    /// Stamp an instant with a timezone label
    pub fn new(date_time: DateTime<FixedOffset>, time_zone: &str) -> Self {
        Self {
            date: date_time.date_naive(),
            date_time,
            time_zone: time_zone.to_string(),
        }
    }
}

impl EventDescriptor {
    pub fn new(summary: &str, start: EventDateTime, end: EventDateTime) -> Self {
        Self {
            summary: summary.to_string(),
            original_start_time: start.clone(),
            start,
            end,
        }
    }

    /// Length of the event
    pub fn duration(&self) -> Duration {
        self.end.date_time.signed_duration_since(self.start.date_time)
    }
}

/// Event as returned by the calendar after creation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEvent {
    pub id: String,
    #[serde(default)]
    pub html_link: Option<String>,
}
