mod driver;
pub mod mapper;
pub mod models;
mod report;

pub use driver::{DryRunSink, SyncDriver};
pub use mapper::{EventMapper, MalformedRecord, Mapping, SkipReason};
pub use models::{DueDate, TaskRecord};
pub use report::{Outcome, RecordOutcome, SyncReport};

use crate::components::google_calendar::models::{CreatedEvent, EventDescriptor};
use crate::error::SyncResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Where tasks are read from
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Fetch all tasks in source order
    async fn fetch_tasks(&self) -> SyncResult<Vec<TaskRecord>>;
}

/// Where events are created
#[async_trait]
pub trait CalendarSink: Send + Sync {
    /// Create a single event
    async fn create_event(&self, event: &EventDescriptor) -> SyncResult<CreatedEvent>;
}

#[async_trait]
impl<T: TaskSource + ?Sized> TaskSource for Arc<T> {
    async fn fetch_tasks(&self) -> SyncResult<Vec<TaskRecord>> {
        (**self).fetch_tasks().await
    }
}

#[async_trait]
impl<T: CalendarSink + ?Sized> CalendarSink for Arc<T> {
    async fn create_event(&self, event: &EventDescriptor) -> SyncResult<CreatedEvent> {
        (**self).create_event(event).await
    }
}
