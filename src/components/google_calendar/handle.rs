use crate::components::sync::CalendarSink;
use crate::config::Config;
use crate::error::SyncResult;
use super::actor::GoogleCalendarActorHandle;
use super::models::{CreatedEvent, EventDescriptor};
use super::token::TokenManager;
use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for interacting with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarHandle {
    actor_handle: GoogleCalendarActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl GoogleCalendarHandle {
    /// Create a new GoogleCalendarHandle and spawn the actor
    pub fn new(config: &Config) -> Self {
        use super::actor::GoogleCalendarActor;

        let client = Client::new();
        let token_manager = TokenManager::new(
            PathBuf::from(&config.google_token_path),
            config.google_client_id.clone(),
            config.google_client_secret.clone(),
            client.clone(),
        );

        let (mut actor, handle) =
            GoogleCalendarActor::new(config.google_calendar_id.clone(), token_manager, client);

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> SyncResult<()> {
        self.actor_handle.shutdown().await
    }
}

#[async_trait]
impl CalendarSink for GoogleCalendarHandle {
    async fn create_event(&self, event: &EventDescriptor) -> SyncResult<CreatedEvent> {
        self.actor_handle.create_event(event.clone()).await
    }
}
