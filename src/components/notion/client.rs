use crate::components::sync::models::TaskRecord;
use crate::components::sync::TaskSource;
use crate::config::{Config, PropertyNames};
use crate::error::{notion_error, SyncResult};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{info, warn};

use super::models::QueryResponse;

const NOTION_API_BASE: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

/// Reads tasks from a Notion database
pub struct NotionClient {
    token: String,
    database_id: String,
    properties: PropertyNames,
    client: Client,
}

impl NotionClient {
    pub fn new(config: &Config) -> Self {
        Self {
            token: config.notion_token.clone(),
            database_id: config.notion_database_id.clone(),
            properties: config.mapper.properties.clone(),
            client: Client::new(),
        }
    }

    /// Query the first page of the database
    async fn query_database(&self) -> SyncResult<QueryResponse> {
        let url = format!("{}/databases/{}/query", NOTION_API_BASE, self.database_id);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&json!({}))
            .send()
            .await
            .map_err(|e| notion_error(&format!("Failed to query database: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(notion_error(&format!(
                "Failed to query database: HTTP {} - {}",
                status, error_body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| notion_error(&format!("Failed to parse query response: {}", e)))
    }
}

#[async_trait]
impl TaskSource for NotionClient {
    async fn fetch_tasks(&self) -> SyncResult<Vec<TaskRecord>> {
        let response = self.query_database().await?;

        // TODO: follow next_cursor once runs need more than one result page
        if response.has_more {
            warn!(
                "Notion database has more than {} tasks, only the first page is synced",
                response.results.len()
            );
        }

        info!("Read {} pages from Notion", response.results.len());

        Ok(response
            .results
            .iter()
            .map(|page| page.to_task(&self.properties))
            .collect())
    }
}
