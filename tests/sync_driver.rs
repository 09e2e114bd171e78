use async_trait::async_trait;
use chrono::{Local, TimeZone};
use notion2gcal::components::google_calendar::models::{CreatedEvent, EventDescriptor};
use notion2gcal::components::sync::{
    CalendarSink, DryRunSink, EventMapper, MalformedRecord, Outcome, SkipReason, SyncDriver,
    TaskRecord, TaskSource,
};
use notion2gcal::config::MapperConfig;
use notion2gcal::error::{google_calendar_error, notion_error, SyncResult};
use notion2gcal::utils::clock::FixedClock;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// Task source returning a fixed list of tasks
struct MockTaskSource {
    tasks: Vec<TaskRecord>,
}

#[async_trait]
impl TaskSource for MockTaskSource {
    async fn fetch_tasks(&self) -> SyncResult<Vec<TaskRecord>> {
        Ok(self.tasks.clone())
    }
}

/// Task source that always fails
struct FailingTaskSource;

#[async_trait]
impl TaskSource for FailingTaskSource {
    async fn fetch_tasks(&self) -> SyncResult<Vec<TaskRecord>> {
        Err(notion_error("HTTP 401 - unauthorized"))
    }
}

/// Calendar sink recording every created event
struct MockCalendar {
    created: Mutex<Vec<EventDescriptor>>,
    failing_summaries: HashSet<String>,
    /// Summaries listed here finish in this order, each waiting for the ones before it
    completion_order: Vec<String>,
    finished: watch::Sender<usize>,
}

impl Default for MockCalendar {
    fn default() -> Self {
        Self {
            created: Mutex::default(),
            failing_summaries: HashSet::new(),
            completion_order: Vec::new(),
            finished: watch::channel(0).0,
        }
    }
}

impl MockCalendar {
    fn failing_on(summary: &str) -> Self {
        Self {
            failing_summaries: [summary.to_string()].into_iter().collect(),
            ..Self::default()
        }
    }

    fn completing_in_order(summaries: &[&str]) -> Self {
        Self {
            completion_order: summaries.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    fn created_summaries(&self) -> Vec<String> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.summary.clone())
            .collect()
    }
}

#[async_trait]
impl CalendarSink for MockCalendar {
    async fn create_event(&self, event: &EventDescriptor) -> SyncResult<CreatedEvent> {
        if let Some(turn) = self
            .completion_order
            .iter()
            .position(|summary| *summary == event.summary)
        {
            let mut finished = self.finished.subscribe();
            finished.wait_for(|done| *done >= turn).await.unwrap();
        }

        if self.failing_summaries.contains(&event.summary) {
            return Err(google_calendar_error("HTTP 500 - backend error"));
        }

        let id = {
            let mut created = self.created.lock().unwrap();
            created.push(event.clone());
            format!("event{}", created.len())
        };
        self.finished.send_modify(|done| *done += 1);

        Ok(CreatedEvent { id, html_link: None })
    }
}

fn mapper() -> EventMapper {
    let now = Local.with_ymd_and_hms(2023, 10, 8, 12, 0, 0).unwrap();
    EventMapper::new(&MapperConfig::default(), Arc::new(FixedClock(now))).unwrap()
}

fn tasks() -> Vec<TaskRecord> {
    let mut unnamed = TaskRecord::new("", "In Progress");
    unnamed.name = None;
    unnamed.id = Some("page-4".to_string());

    vec![
        TaskRecord::new("Ship report", "In Progress").with_due_date("2023-10-09"),
        TaskRecord::new("Old idea", "Backlog").with_due_date("2099-01-01"),
        TaskRecord::new("Standup", "To Do")
            .with_due_range("2023-10-08T14:00:00+08:00", "2023-10-08T15:00:00+08:00"),
        unnamed,
        TaskRecord::new("Taxes", "In Progress").with_due_date("2022-01-01"),
    ]
}

#[tokio::test]
async fn test_run_creates_events_in_task_order() {
    let calendar = Arc::new(MockCalendar::default());
    let driver = SyncDriver::new(MockTaskSource { tasks: tasks() }, calendar.clone(), mapper());

    let report = driver.run().await.unwrap();

    assert_eq!(report.outcomes.len(), 5);
    assert_eq!(report.created(), 3);
    assert_eq!(report.skipped(), 2);
    assert_eq!(report.failed(), 0);

    let labels: Vec<_> = report.outcomes.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(
        labels,
        vec!["Ship report", "Old idea", "Standup", "<unnamed page-4>", "Taxes"]
    );

    assert!(matches!(
        &report.outcomes[1].outcome,
        Outcome::Skipped(SkipReason::IgnoredStatus(status)) if status == "Backlog"
    ));
    assert!(matches!(
        &report.outcomes[3].outcome,
        Outcome::Skipped(SkipReason::Malformed(MalformedRecord::MissingField("name")))
    ));

    assert_eq!(
        calendar.created_summaries(),
        vec!["Ship report", "Standup", "Taxes"]
    );

    let created = calendar.created.lock().unwrap();
    assert_eq!(created[0].start.date.to_string(), "2023-10-09");
    assert_eq!(created[1].start.date_time.to_rfc3339(), "2023-10-08T14:00:00+08:00");
    // Overdue task is moved to today
    assert_eq!(created[2].start.date.to_string(), "2023-10-08");
}

#[tokio::test]
async fn test_failed_creation_does_not_abort_run() {
    let calendar = Arc::new(MockCalendar::failing_on("Standup"));
    let driver = SyncDriver::new(MockTaskSource { tasks: tasks() }, calendar.clone(), mapper());

    let report = driver.run().await.unwrap();

    assert_eq!(report.created(), 2);
    assert_eq!(report.failed(), 1);
    assert!(matches!(report.outcomes[2].outcome, Outcome::Failed(_)));
    assert!(report.outcomes[2].to_string().contains("backend error"));

    // Tasks after the failure are still created
    assert_eq!(calendar.created_summaries(), vec!["Ship report", "Taxes"]);
}

#[tokio::test]
async fn test_fetch_failure_aborts_run() {
    let calendar = Arc::new(MockCalendar::default());
    let driver = SyncDriver::new(FailingTaskSource, calendar.clone(), mapper());

    let err = driver.run().await.unwrap_err();

    assert!(err.to_string().contains("unauthorized"));
    assert!(calendar.created_summaries().is_empty());
}

#[tokio::test]
async fn test_rerun_creates_duplicates() {
    // No sync state is kept, so a second run creates every event again
    let calendar = Arc::new(MockCalendar::default());
    let driver = SyncDriver::new(MockTaskSource { tasks: tasks() }, calendar.clone(), mapper());

    let first = driver.run().await.unwrap();
    let second = driver.run().await.unwrap();

    assert_eq!(first.created(), 3);
    assert_eq!(second.created(), 3);

    let created = calendar.created.lock().unwrap();
    assert_eq!(created.len(), 6);
    assert_eq!(created[0], created[3]);
    assert_eq!(created[1], created[4]);
    assert_eq!(created[2], created[5]);
}

#[tokio::test]
async fn test_concurrent_creates_keep_task_order() {
    let calendar = Arc::new(MockCalendar::completing_in_order(&["ccc", "bb", "a"]));
    let tasks = vec![
        TaskRecord::new("a", "To Do"),
        TaskRecord::new("bb", "To Do"),
        TaskRecord::new("ccc", "To Do"),
    ];
    let driver = SyncDriver::new(MockTaskSource { tasks }, calendar.clone(), mapper())
        .with_max_concurrent_creates(3);

    let report = driver.run().await.unwrap();

    let labels: Vec<_> = report.outcomes.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(labels, vec!["a", "bb", "ccc"]);
    assert_eq!(report.created(), 3);
    // Completion order differs from task order
    assert_eq!(calendar.created_summaries(), vec!["ccc", "bb", "a"]);
}

#[tokio::test]
async fn test_dry_run_creates_nothing_remotely() {
    let driver = SyncDriver::new(
        MockTaskSource { tasks: tasks() },
        DryRunSink::default(),
        mapper(),
    );

    let report = driver.run().await.unwrap();

    assert_eq!(report.created(), 3);
    let ids: Vec<_> = report
        .outcomes
        .iter()
        .filter_map(|o| match &o.outcome {
            Outcome::Created(event) => Some(event.id.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(ids, vec!["dry-run-1", "dry-run-2", "dry-run-3"]);
    assert_eq!(report.to_string(), "5 tasks: 3 created, 2 skipped, 0 failed");
}
