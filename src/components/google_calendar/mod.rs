mod actor;
mod handle;
pub mod models;
pub mod token;

pub use actor::events_url;
pub use handle::GoogleCalendarHandle;
pub use models::{CreatedEvent, EventDateTime, EventDescriptor};
