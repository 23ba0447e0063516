//! Error types for the papertrail-core library.

use thiserror::Error;

/// Main error type for the papertrail library.
#[derive(Error, Debug)]
pub enum PapertrailError {
    /// Key-value store error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Invoice editing error.
    #[error("invoice error: {0}")]
    Invoice(#[from] InvoiceError),

    /// Record validation error.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Record (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by key-value store backends.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backing file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but does not hold a key-value object.
    #[error("store at {path} is corrupt: {reason}")]
    Corrupt { path: String, reason: String },

    /// The store is not reachable (e.g. no `window.localStorage`).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected the operation.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Errors related to editing an invoice.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InvoiceError {
    /// An invoice must keep at least one line item.
    #[error("cannot remove the last line item")]
    LastLineItem,

    /// A record without line items was offered for saving.
    #[error("an invoice needs at least one line item")]
    NoLineItems,

    /// No line item with the given id.
    #[error("line item not found: {0}")]
    LineItemNotFound(String),
}

/// Errors raised when a record fails validation before it is saved.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Required field is empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Value is not one of the accepted choices.
    #[error("invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

/// Result type for the papertrail library.
pub type Result<T> = std::result::Result<T, PapertrailError>;
