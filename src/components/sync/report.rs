use crate::components::google_calendar::models::CreatedEvent;
use crate::error::Error;
use std::fmt;

use super::mapper::SkipReason;

/// What happened to a single task
#[derive(Debug)]
pub enum Outcome {
    Created(CreatedEvent),
    Skipped(SkipReason),
    Failed(Error),
}

/// Outcome of one task, labelled for the report
#[derive(Debug)]
pub struct RecordOutcome {
    pub label: String,
    pub outcome: Outcome,
}

/// Per-task outcomes of a sync run, in task order
#[derive(Debug, Default)]
pub struct SyncReport {
    pub outcomes: Vec<RecordOutcome>,
}

impl SyncReport {
    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Created(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes.iter().filter(|r| pred(&r.outcome)).count()
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tasks: {} created, {} skipped, {} failed",
            self.outcomes.len(),
            self.created(),
            self.skipped(),
            self.failed()
        )
    }
}

impl fmt::Display for RecordOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Created(event) => write!(f, "{}: created {}", self.label, event.id),
            Outcome::Skipped(reason) => write!(f, "{}: skipped, {}", self.label, reason),
            Outcome::Failed(e) => write!(f, "{}: failed, {}", self.label, e),
        }
    }
}
