//! Data models for invoices, clients and settings.

pub mod client;
pub mod config;
pub mod invoice;
pub mod settings;

use chrono::{DateTime, Utc};

/// A persisted record addressed by id and carrying save timestamps.
pub trait Record {
    /// Stable identifier, assigned once.
    fn id(&self) -> &str;

    fn set_created_at(&mut self, at: DateTime<Utc>);

    fn set_updated_at(&mut self, at: DateTime<Utc>);
}

/// Generate a fresh record id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
