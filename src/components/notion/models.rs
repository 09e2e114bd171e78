use crate::components::sync::models::{DueDate, TaskRecord};
use crate::config::PropertyNames;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Response of the database query endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    pub results: Vec<Page>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// A database row
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Page {
    /// Read the task fields out of the page properties
    ///
    /// Anything missing or of an unexpected shape is left as `None`.
    pub fn to_task(&self, names: &PropertyNames) -> TaskRecord {
        TaskRecord {
            id: Some(self.id.clone()),
            name: self.title(&names.name),
            status: self.status(&names.status),
            due: self.due(&names.due),
        }
    }

    fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Text of the first title segment
    fn title(&self, name: &str) -> Option<String> {
        let segment = self
            .property(name)?
            .get("title")?
            .as_array()?
            .first()?;

        segment
            .get("text")
            .and_then(|t| t.get("content"))
            .or_else(|| segment.get("plain_text"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
    }

    /// Name of a `select` or `status` option
    fn status(&self, name: &str) -> Option<String> {
        let property = self.property(name)?;
        property
            .get("select")
            .filter(|v| !v.is_null())
            .or_else(|| property.get("status"))
            .and_then(|option| option.get("name"))
            .and_then(|n| n.as_str())
            .map(|s| s.to_string())
    }

    fn due(&self, name: &str) -> Option<DueDate> {
        let date = self.property(name)?.get("date")?.as_object()?;
        let field = |key: &str| date.get(key).and_then(|v| v.as_str()).map(|s| s.to_string());

        Some(DueDate {
            start: field("start"),
            end: field("end"),
        })
    }
}
