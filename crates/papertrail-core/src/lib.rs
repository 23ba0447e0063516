//! Core library for the papertrail invoice builder.
//!
//! This crate provides:
//! - Invoice, client and settings data models
//! - The totals engine and localized currency formatting
//! - A persistence layer over an injected key-value store
//! - Editing sessions with debounced auto-save
//! - Dashboard queries (search, sort, outstanding totals)

pub mod clock;
pub mod currency;
pub mod dashboard;
pub mod error;
pub mod merge;
pub mod models;
pub mod repository;
pub mod session;
pub mod storage;
pub mod totals;

pub use clock::{Clock, ManualClock, SystemClock};
pub use currency::format_currency;
pub use dashboard::{DashboardStats, SortBy, search, sort_invoices};
pub use error::{InvoiceError, PapertrailError, Result, StorageError, ValidationError};
pub use models::client::{ClientInfo, SavedClient};
pub use models::invoice::{
    Branding, ColorTheme, DiscountType, DisplaySettings, Invoice, InvoiceStatus, LineItem,
    PdfSettings, Template,
};
pub use models::settings::AppSettings;
pub use repository::Repository;
pub use session::{EditingSession, PendingSave};
pub use storage::{KeyValueStore, MemoryStore};
#[cfg(feature = "native")]
pub use storage::FileStore;
pub use totals::{InvoiceTotals, invoice_totals, line_total};
