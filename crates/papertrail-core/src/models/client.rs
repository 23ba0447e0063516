//! Client contact data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Record;
use crate::error::ValidationError;

/// Client contact details embedded in an invoice.
///
/// Invoices hold a copy, so editing a saved client never rewrites past invoices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientInfo {
    pub name: String,
    pub email: String,
    pub address: String,
    pub phone: String,
    pub company: String,
    pub tax_id: String,
}

/// A client stored in the client book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedClient {
    pub id: String,

    #[serde(flatten)]
    pub info: ClientInfo,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SavedClient {
    /// Create a new, not yet persisted, client.
    pub fn new(info: ClientInfo) -> Self {
        let now = Utc::now();
        Self {
            id: super::new_id(),
            info,
            created_at: now,
            updated_at: now,
        }
    }

    /// Name and email are required before a client can be saved. Only empty
    /// values are rejected; whitespace counts as filled in.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.info.name.is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if self.info.email.is_empty() {
            return Err(ValidationError::MissingField("email"));
        }
        Ok(())
    }

    /// Snapshot of the contact details for embedding in an invoice.
    pub fn to_client_info(&self) -> ClientInfo {
        self.info.clone()
    }
}

impl Record for SavedClient {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn info(name: &str, email: &str) -> ClientInfo {
        ClientInfo {
            name: name.to_string(),
            email: email.to_string(),
            ..ClientInfo::default()
        }
    }

    #[test]
    fn test_validate_requires_name_and_email() {
        assert_eq!(
            SavedClient::new(info("", "a@b.c")).validate(),
            Err(ValidationError::MissingField("name"))
        );
        assert_eq!(
            SavedClient::new(info("Acme", "")).validate(),
            Err(ValidationError::MissingField("email"))
        );
        assert!(SavedClient::new(info("Acme", "billing@acme.test")).validate().is_ok());
    }

    #[test]
    fn test_whitespace_counts_as_filled_in() {
        assert!(SavedClient::new(info("  ", " ")).validate().is_ok());
    }

    #[test]
    fn test_serialized_fields_are_flat_camel_case() {
        let mut client = SavedClient::new(info("Acme", "billing@acme.test"));
        client.info.tax_id = "DE123".to_string();

        let json = serde_json::to_value(&client).unwrap();
        assert_eq!(json["name"], "Acme");
        assert_eq!(json["taxId"], "DE123");
        assert!(json.get("info").is_none());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_reads_record_with_missing_contact_fields() {
        let json = r#"{
            "id": "c1",
            "name": "Acme",
            "email": "billing@acme.test",
            "createdAt": "2024-03-01T10:00:00.000Z",
            "updatedAt": "2024-03-01T10:00:00.000Z"
        }"#;

        let client: SavedClient = serde_json::from_str(json).unwrap();
        assert_eq!(client.id, "c1");
        assert_eq!(client.info.phone, "");
    }
}
