// Export components
pub mod google_calendar;
pub mod notion;
pub mod sync;

pub use google_calendar::GoogleCalendarHandle;
pub use notion::NotionClient;
