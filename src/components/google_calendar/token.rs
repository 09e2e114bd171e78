use crate::error::{google_calendar_error, SyncResult};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::info;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Tokens are refreshed this long before they actually expire
const EXPIRY_MARGIN_SECS: i64 = 60;

/// OAuth token as stored on disk
///
/// Reads both this crate's own format (`access_token`, `expires_at`) and the
/// `token.json` written by the google-auth library (`token`, `expiry`).
/// Fields it doesn't know, like `client_id` or `scopes`, are written back
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    #[serde(alias = "token")]
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Expiry as unix seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StoredToken {
    /// Whether the token should be refreshed before use
    ///
    /// A token without any expiry information is assumed valid.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let expiry = self
            .expires_at
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
            .or(self.expiry);

        match expiry {
            Some(expiry) => expiry <= now + Duration::seconds(EXPIRY_MARGIN_SECS),
            None => false,
        }
    }
}

/// Loads the Google OAuth token from disk and keeps it fresh
#[derive(Clone)]
pub struct TokenManager {
    path: PathBuf,
    client_id: String,
    client_secret: String,
    client: Client,
    token: Arc<Mutex<Option<StoredToken>>>,
}

impl TokenManager {
    pub fn new(path: PathBuf, client_id: String, client_secret: String, client: Client) -> Self {
        Self {
            path,
            client_id,
            client_secret,
            client,
            token: Arc::new(Mutex::new(None)),
        }
    }

    /// Get a valid access token, refreshing it if expired
    pub async fn get_access_token(&self) -> SyncResult<String> {
        // Held across the refresh so concurrent callers refresh only once
        let mut cached = self.token.lock().await;

        let token = match cached.take() {
            Some(token) => token,
            None => self.load().await?,
        };

        let token = if token.is_expired(Utc::now()) {
            self.refresh_token(&token).await?
        } else {
            token
        };

        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    async fn load(&self) -> SyncResult<StoredToken> {
        let content = fs::read_to_string(&self.path).await.map_err(|e| {
            google_calendar_error(&format!(
                "Failed to read token from {}: {}",
                self.path.display(),
                e
            ))
        })?;

        serde_json::from_str(&content)
            .map_err(|e| google_calendar_error(&format!("Failed to parse token JSON: {}", e)))
    }

    async fn save(&self, token: &StoredToken) -> SyncResult<()> {
        let content = serde_json::to_string_pretty(token)?;
        fs::write(&self.path, content).await?;
        Ok(())
    }

    /// Refresh an expired token
    async fn refresh_token(&self, token: &StoredToken) -> SyncResult<StoredToken> {
        let refresh_token = token
            .refresh_token
            .as_deref()
            .ok_or_else(|| google_calendar_error("Token expired and no refresh token is stored"))?;

        info!("Refreshing Google Calendar access token");

        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .client
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to refresh token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to refresh token: HTTP {} - {}",
                status, error_body
            )));
        }

        let new_token: Value = response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse token response: {}", e)))?;

        let refreshed = refreshed_token(&new_token, token, Utc::now())?;
        self.save(&refreshed).await?;

        Ok(refreshed)
    }
}

/// Apply a refresh response to the token it was requested with
///
/// The expiry is written in the same form the stored token used.
fn refreshed_token(
    response: &Value,
    previous: &StoredToken,
    now: DateTime<Utc>,
) -> SyncResult<StoredToken> {
    let access_token = response
        .get("access_token")
        .and_then(|v| v.as_str())
        .ok_or_else(|| google_calendar_error("Token response missing 'access_token' field"))?;

    let expires_in = response
        .get("expires_in")
        .and_then(|v| v.as_i64())
        .unwrap_or(3600);

    // Google usually doesn't hand out a new refresh token
    let refresh_token = response
        .get("refresh_token")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .or_else(|| previous.refresh_token.clone());

    let expires = now + Duration::seconds(expires_in);
    let (expires_at, expiry) = if previous.expiry.is_some() {
        (None, Some(expires))
    } else {
        (Some(expires.timestamp()), None)
    };

    Ok(StoredToken {
        access_token: access_token.to_string(),
        refresh_token,
        expires_at,
        expiry,
        extra: previous.extra.clone(),
    })
}
