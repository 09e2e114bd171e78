use crate::components::google_calendar::models::{CreatedEvent, EventDescriptor};
use crate::error::SyncResult;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{error, info, warn};

use super::mapper::{EventMapper, Mapping};
use super::models::TaskRecord;
use super::report::{Outcome, RecordOutcome, SyncReport};
use super::{CalendarSink, TaskSource};

/// Fetches tasks, maps them and creates the resulting events
pub struct SyncDriver<S, C> {
    source: S,
    sink: C,
    mapper: EventMapper,
    max_concurrent_creates: usize,
}

impl<S: TaskSource, C: CalendarSink> SyncDriver<S, C> {
    pub fn new(source: S, sink: C, mapper: EventMapper) -> Self {
        Self {
            source,
            sink,
            mapper,
            max_concurrent_creates: 1,
        }
    }

    /// Allow up to `limit` event creations in flight; the report keeps task order
    pub fn with_max_concurrent_creates(mut self, limit: usize) -> Self {
        self.max_concurrent_creates = limit.max(1);
        self
    }

    /// Run one sync pass
    ///
    /// Only a failed fetch aborts the run. Skipped tasks and failed creations
    /// are recorded in the report. Nothing is remembered between runs, so
    /// every run creates its events again.
    pub async fn run(&self) -> SyncResult<SyncReport> {
        info!("Fetching tasks");
        let tasks = self.source.fetch_tasks().await?;
        info!("Fetched {} tasks", tasks.len());

        let outcomes = stream::iter(tasks.iter())
            .map(|task| self.process(task))
            .buffered(self.max_concurrent_creates)
            .collect::<Vec<_>>()
            .await;

        let report = SyncReport { outcomes };
        info!("Sync finished: {}", report);
        Ok(report)
    }

    async fn process(&self, task: &TaskRecord) -> RecordOutcome {
        let label = task.label();

        let outcome = match self.mapper.map(task) {
            Mapping::Skipped(reason) => Outcome::Skipped(reason),
            Mapping::Event(event) => match self.sink.create_event(&event).await {
                Ok(created) => {
                    info!("Created event for '{}': {}", label, created.id);
                    Outcome::Created(created)
                }
                Err(e) => {
                    error!("Failed to create event for '{}': {}", label, e);
                    Outcome::Failed(e)
                }
            },
        };

        RecordOutcome { label, outcome }
    }
}

/// Sink that only logs the events it would create
#[derive(Debug, Default)]
pub struct DryRunSink {
    count: AtomicUsize,
}

#[async_trait]
impl CalendarSink for DryRunSink {
    async fn create_event(&self, event: &EventDescriptor) -> SyncResult<CreatedEvent> {
        let n = self.count.fetch_add(1, Ordering::SeqCst) + 1;
        match serde_json::to_string(event) {
            Ok(body) => info!("[dry run] Would create event: {}", body),
            Err(e) => warn!("[dry run] Would create event '{}' ({})", event.summary, e),
        }
        Ok(CreatedEvent {
            id: format!("dry-run-{}", n),
            html_link: None,
        })
    }
}
