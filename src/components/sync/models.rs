use serde::{Deserialize, Serialize};

/// A task as read from the task database
///
/// Fields are optional so that a record with missing data still reaches
/// the mapper, which reports what is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Source page ID, used to label records without a name
    pub id: Option<String>,
    pub name: Option<String>,
    pub status: Option<String>,
    pub due: Option<DueDate>,
}

/// Due date or date range, as ISO 8601 date or timestamp strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueDate {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl DueDate {
    /// True when neither end of the range is set
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

impl TaskRecord {
    /// Create a task with a name and status and no due date
    pub fn new(name: &str, status: &str) -> Self {
        Self {
            id: None,
            name: Some(name.to_string()),
            status: Some(status.to_string()),
            due: None,
        }
    }

    /// Set a single due date
    pub fn with_due_date(mut self, start: &str) -> Self {
        self.due = Some(DueDate {
            start: Some(start.to_string()),
            end: None,
        });
        self
    }

    /// Set a due date range
    pub fn with_due_range(mut self, start: &str, end: &str) -> Self {
        self.due = Some(DueDate {
            start: Some(start.to_string()),
            end: Some(end.to_string()),
        });
        self
    }

    /// Human readable identifier for logs and reports
    pub fn label(&self) -> String {
        match (&self.name, &self.id) {
            (Some(name), _) => name.clone(),
            (None, Some(id)) => format!("<unnamed {}>", id),
            (None, None) => "<unnamed>".to_string(),
        }
    }
}
