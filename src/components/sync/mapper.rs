//! Task to calendar event mapping.
//!
//! A task becomes at most one event:
//! - ignored status: skipped
//! - no due date: placeholder event today
//! - single due date: placeholder event on that date, or today when it has passed
//! - due range: timed event over the range, or placeholder today when the end has passed
//!
//! Placeholder events are one hour long, starting at the configured hour in the
//! target timezone. All "has passed" checks compare civil dates against the
//! clock's local date.

use crate::components::google_calendar::models::{EventDateTime, EventDescriptor};
use crate::config::MapperConfig;
use crate::error::{config_error, SyncResult};
use crate::utils::clock::Clock;
use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeZone, Timelike,
};
use chrono_tz::Tz;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use super::models::TaskRecord;

/// Why a record could not be turned into an event
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedRecord {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' has unparseable date '{value}'")]
    InvalidDate { field: &'static str, value: String },

    #[error("due range ends ({end}) before it starts ({start})")]
    InvertedRange { start: String, end: String },

    #[error("{0} does not exist in the target timezone")]
    UnrepresentableTime(NaiveDateTime),
}

/// Why a record produced no event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    IgnoredStatus(String),
    Malformed(MalformedRecord),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::IgnoredStatus(status) => write!(f, "ignored status '{}'", status),
            SkipReason::Malformed(e) => write!(f, "malformed record: {}", e),
        }
    }
}

/// Result of mapping one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mapping {
    Event(EventDescriptor),
    Skipped(SkipReason),
}

/// A parsed due date value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DueValue {
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
}

impl DueValue {
    /// Civil date, in the value's own offset for timestamps
    fn civil_date(&self) -> NaiveDate {
        match self {
            DueValue::Date(date) => *date,
            DueValue::DateTime(dt) => dt.date_naive(),
        }
    }
}

/// Maps task records to calendar event descriptors
pub struct EventMapper {
    ignored_statuses: BTreeSet<String>,
    default_time: NaiveTime,
    timezone: Tz,
    clock: Arc<dyn Clock>,
}

impl EventMapper {
    /// Build a mapper, validating the timezone and hour
    pub fn new(config: &MapperConfig, clock: Arc<dyn Clock>) -> SyncResult<Self> {
        let timezone: Tz = config
            .timezone
            .parse()
            .map_err(|_| config_error(&format!("Unknown timezone: {}", config.timezone)))?;

        let default_time = NaiveTime::from_hms_opt(config.default_hour, 0, 0).ok_or_else(|| {
            config_error(&format!(
                "Default event hour must be 0-23, got {}",
                config.default_hour
            ))
        })?;

        Ok(Self {
            ignored_statuses: config.ignored_statuses.clone(),
            default_time,
            timezone,
            clock,
        })
    }

    /// Map a task to an event, or say why it is skipped
    pub fn map(&self, task: &TaskRecord) -> Mapping {
        match self.try_map(task) {
            Ok(mapping) => {
                if let Mapping::Skipped(reason) = &mapping {
                    debug!("Skipping task '{}': {}", task.label(), reason);
                }
                mapping
            }
            Err(e) => {
                warn!("Skipping malformed task '{}': {}", task.label(), e);
                Mapping::Skipped(SkipReason::Malformed(e))
            }
        }
    }

    fn try_map(&self, task: &TaskRecord) -> Result<Mapping, MalformedRecord> {
        let name = task
            .name
            .as_deref()
            .ok_or(MalformedRecord::MissingField("name"))?;
        let status = task
            .status
            .as_deref()
            .ok_or(MalformedRecord::MissingField("status"))?;

        if self.ignored_statuses.contains(status) {
            return Ok(Mapping::Skipped(SkipReason::IgnoredStatus(
                status.to_string(),
            )));
        }

        let due = match &task.due {
            Some(due) if !due.is_empty() => due,
            _ => return self.all_day_event(name, None).map(Mapping::Event),
        };

        let start = due
            .start
            .as_deref()
            .ok_or(MalformedRecord::MissingField("due.start"))?;
        let start = self.parse_due("due.start", start)?;
        let today = self.clock.today();

        let event = match due.end.as_deref() {
            None if start.civil_date() < today => self.all_day_event(name, None)?,
            None => self.all_day_event(name, Some(start.civil_date()))?,
            Some(end) => {
                let end = self.parse_due("due.end", end)?;
                if end.civil_date() < today {
                    self.all_day_event(name, None)?
                } else {
                    self.timed_event(name, start, end)?
                }
            }
        };

        Ok(Mapping::Event(event))
    }

    /// One hour placeholder event on `anchor`, or today when absent
    fn all_day_event(
        &self,
        name: &str,
        anchor: Option<NaiveDate>,
    ) -> Result<EventDescriptor, MalformedRecord> {
        // Today is the clock's local date, even when the target timezone is
        // already on another day.
        let anchor = anchor.unwrap_or_else(|| self.clock.today());
        let start = self.localize(anchor.and_time(self.default_time))?;
        let end = start + Duration::hours(1);

        let tz = self.timezone.name();
        Ok(EventDescriptor::new(
            name,
            EventDateTime::new(start, tz),
            EventDateTime::new(end, tz),
        ))
    }

    /// Event spanning the due range, with a past start moved up to now
    fn timed_event(
        &self,
        name: &str,
        start: DueValue,
        end: DueValue,
    ) -> Result<EventDescriptor, MalformedRecord> {
        let mut event_start = self.instant(start)?;
        let event_end = self.instant(end)?;

        if start.civil_date() < self.clock.today() {
            let now = self.clock.now().fixed_offset();
            let now = now.with_nanosecond(0).unwrap_or(now);
            // The end is kept as given, so "now" can't pass it.
            event_start = now.min(event_end);
        } else if event_end < event_start {
            return Err(MalformedRecord::InvertedRange {
                start: event_start.to_rfc3339(),
                end: event_end.to_rfc3339(),
            });
        }

        // Stamped with the target timezone even though the instants keep their
        // source offsets.
        let tz = self.timezone.name();
        Ok(EventDescriptor::new(
            name,
            EventDateTime::new(event_start, tz),
            EventDateTime::new(event_end, tz),
        ))
    }

    fn parse_due(&self, field: &'static str, value: &str) -> Result<DueValue, MalformedRecord> {
        let value = value.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Ok(DueValue::DateTime(dt));
        }
        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            return Ok(DueValue::Date(date));
        }
        // Timestamps without an offset are read as target timezone wall time
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
            return self.localize(naive).map(DueValue::DateTime);
        }
        Err(MalformedRecord::InvalidDate {
            field,
            value: value.to_string(),
        })
    }

    /// Dates in a range start at midnight in the target timezone
    fn instant(&self, value: DueValue) -> Result<DateTime<FixedOffset>, MalformedRecord> {
        match value {
            DueValue::DateTime(dt) => Ok(dt),
            DueValue::Date(date) => self.localize(date.and_time(NaiveTime::MIN)),
        }
    }

    /// Wall time in the target timezone
    ///
    /// Ambiguous times take the earlier instant. Times skipped by a forward
    /// clock change are read with the offset in force before the change, so
    /// 02:00 on a New York spring-forward day becomes 03:00 EDT.
    fn localize(&self, naive: NaiveDateTime) -> Result<DateTime<FixedOffset>, MalformedRecord> {
        match self.timezone.from_local_datetime(&naive) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(dt.fixed_offset()),
            LocalResult::None => {
                let before = self
                    .timezone
                    .offset_from_utc_datetime(&(naive - Duration::days(1)))
                    .fix();
                naive
                    .and_local_timezone(before)
                    .single()
                    .map(|dt| dt.with_timezone(&self.timezone).fixed_offset())
                    .ok_or(MalformedRecord::UnrepresentableTime(naive))
            }
        }
    }
}
