use crate::error::{config_error, env_error, SyncResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;

/// Default target timezone for created events
pub const DEFAULT_TIMEZONE: &str = "America/New_York";
/// Default hour of day for placeholder all-day events
pub const DEFAULT_EVENT_HOUR: u32 = 9;
/// Google's alias for the user's main calendar
pub const DEFAULT_CALENDAR_ID: &str = "primary";
/// Default location of the stored Google OAuth token
pub const DEFAULT_TOKEN_PATH: &str = "token.json";
/// Optional file overriding the mapper settings
pub const MAPPER_CONFIG_PATH: &str = "config/mapper.toml";

/// Statuses skipped unless configured otherwise
pub fn default_ignored_statuses() -> BTreeSet<String> {
    ["Completed", "Backlog"].iter().map(|s| s.to_string()).collect()
}

/// Main configuration structure for the sync
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Notion integration token
    pub notion_token: String,
    /// Notion task database ID
    pub notion_database_id: String,
    /// Google OAuth client ID, used for token refresh
    pub google_client_id: String,
    /// Google OAuth client secret, used for token refresh
    pub google_client_secret: String,
    /// Google Calendar ID events are created on
    pub google_calendar_id: String,
    /// Path of the stored Google OAuth token
    pub google_token_path: String,
    /// Upper bound on in-flight event creations
    pub max_concurrent_creates: usize,
    /// Log mapped events instead of creating them
    pub dry_run: bool,
    /// Task to event mapping settings
    pub mapper: MapperConfig,
}

/// Settings of the task to event mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Tasks in one of these statuses are never synced
    pub ignored_statuses: BTreeSet<String>,
    /// Hour placeholder events start at, in the target timezone
    pub default_hour: u32,
    /// IANA name of the timezone events are stamped with
    pub timezone: String,
    /// Notion property names
    pub properties: PropertyNames,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            ignored_statuses: default_ignored_statuses(),
            default_hour: DEFAULT_EVENT_HOUR,
            timezone: DEFAULT_TIMEZONE.to_string(),
            properties: PropertyNames::default(),
        }
    }
}

/// Names of the Notion database properties a task is read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyNames {
    pub name: String,
    pub status: String,
    pub due: String,
}

impl Default for PropertyNames {
    fn default() -> Self {
        Self {
            name: "Name".to_string(),
            status: "Status".to_string(),
            due: "Due Date".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> SyncResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let mut config = Self::from_vars(|name| env::var(name).ok())?;

        if Path::new(MAPPER_CONFIG_PATH).exists() {
            let content = fs::read_to_string(MAPPER_CONFIG_PATH)?;
            config.mapper = toml::from_str::<MapperConfig>(&content)?;
        }

        Ok(config)
    }

    /// Build the configuration from a variable lookup
    pub fn from_vars<F>(lookup: F) -> SyncResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| lookup(name).ok_or_else(|| env_error(name));

        let notion_token = required("NOTION_TOKEN")?;
        let notion_database_id = required("NOTION_TASK_DB_ID")?;
        let google_client_id = required("GOOGLE_CLIENT_ID")?;
        let google_client_secret = required("GOOGLE_CLIENT_SECRET")?;

        let google_calendar_id =
            lookup("GOOGLE_CALENDAR_ID").unwrap_or_else(|| DEFAULT_CALENDAR_ID.to_string());
        let google_token_path =
            lookup("GOOGLE_TOKEN_PATH").unwrap_or_else(|| DEFAULT_TOKEN_PATH.to_string());

        let max_concurrent_creates = match lookup("MAX_CONCURRENT_CREATES") {
            Some(value) => value
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| config_error("Invalid MAX_CONCURRENT_CREATES format"))?,
            None => 1,
        };

        let dry_run = match lookup("DRY_RUN") {
            Some(value) => parse_flag(&value)
                .ok_or_else(|| config_error("Invalid DRY_RUN format"))?,
            None => false,
        };

        let mut mapper = MapperConfig::default();
        if let Some(timezone) = lookup("TIMEZONE") {
            mapper.timezone = timezone;
        }
        if let Some(hour) = lookup("DEFAULT_EVENT_HOUR") {
            mapper.default_hour = hour
                .parse::<u32>()
                .map_err(|_| config_error("Invalid DEFAULT_EVENT_HOUR format"))?;
        }
        if let Some(statuses) = lookup("IGNORED_STATUSES") {
            mapper.ignored_statuses = statuses
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(Config {
            notion_token,
            notion_database_id,
            google_client_id,
            google_client_secret,
            google_calendar_id,
            google_token_path,
            max_concurrent_creates,
            dry_run,
            mapper,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
