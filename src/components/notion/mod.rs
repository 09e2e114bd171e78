mod client;
pub mod models;

pub use client::NotionClient;
pub use models::{Page, QueryResponse};
