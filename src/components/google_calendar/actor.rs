use crate::error::{google_calendar_error, SyncResult};
use super::models::{CreatedEvent, EventDescriptor};
use super::token::TokenManager;
use reqwest::Client;
use tokio::sync::mpsc;
use tracing::{debug, info};
use url::Url;

const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// The Google Calendar actor that processes messages
pub struct GoogleCalendarActor {
    calendar_id: String,
    token_manager: TokenManager,
    client: Client,
    command_rx: mpsc::Receiver<GoogleCalendarCommand>,
}

/// Commands that can be sent to the Google Calendar actor
pub enum GoogleCalendarCommand {
    CreateEvent(EventDescriptor, mpsc::Sender<SyncResult<CreatedEvent>>),
    Shutdown,
}

/// Handle for communicating with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarActorHandle {
    command_tx: mpsc::Sender<GoogleCalendarCommand>,
}

impl GoogleCalendarActorHandle {
    /// Create an event on the calendar
    pub async fn create_event(&self, event: EventDescriptor) -> SyncResult<CreatedEvent> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(GoogleCalendarCommand::CreateEvent(event, response_tx))
            .await
            .map_err(|e| google_calendar_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| google_calendar_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> SyncResult<()> {
        let _ = self.command_tx.send(GoogleCalendarCommand::Shutdown).await;
        Ok(())
    }
}

impl GoogleCalendarActor {
    /// Create a new actor and return its handle
    pub fn new(
        calendar_id: String,
        token_manager: TokenManager,
        client: Client,
    ) -> (Self, GoogleCalendarActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            calendar_id,
            token_manager,
            client,
            command_rx,
        };

        let handle = GoogleCalendarActorHandle { command_tx };

        (actor, handle)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Google Calendar actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                GoogleCalendarCommand::CreateEvent(event, response_tx) => {
                    // Each request runs on its own so callers can overlap them
                    let calendar_id = self.calendar_id.clone();
                    let token_manager = self.token_manager.clone();
                    let client = self.client.clone();
                    tokio::spawn(async move {
                        let result =
                            Self::create_event(&calendar_id, &token_manager, &client, &event).await;
                        let _ = response_tx.send(result).await;
                    });
                }
                GoogleCalendarCommand::Shutdown => {
                    info!("Google Calendar actor shutting down");
                    break;
                }
            }
        }

        info!("Google Calendar actor shut down");
    }

    /// Insert an event into the calendar
    pub async fn create_event(
        calendar_id: &str,
        token_manager: &TokenManager,
        client: &Client,
        event: &EventDescriptor,
    ) -> SyncResult<CreatedEvent> {
        let access_token = token_manager.get_access_token().await?;
        let url = events_url(calendar_id)?;

        debug!("Creating event '{}' on {}", event.summary, calendar_id);

        let response = client
            .post(url)
            .bearer_auth(access_token)
            .json(event)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to create event: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to create event '{}': HTTP {} - {}",
                event.summary, status, error_body
            )));
        }

        let created: CreatedEvent = response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse created event: {}", e)))?;

        if let Some(link) = &created.html_link {
            debug!("Event created: {}", link);
        }

        Ok(created)
    }
}

/// Events collection URL of a calendar
pub fn events_url(calendar_id: &str) -> SyncResult<Url> {
    let mut url = Url::parse(CALENDAR_API_BASE)
        .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;

    url.path_segments_mut()
        .map_err(|_| google_calendar_error("Calendar API URL cannot be a base"))?
        .extend(["calendars", calendar_id, "events"]);

    Ok(url)
}
