//! Persistence of invoices, clients and settings in a key-value store.
//!
//! Each collection is one JSON document under a fixed key and is rewritten
//! whole on every mutation. Nothing coordinates concurrent writers: two
//! repositories over the same store can each append to a stale snapshot, and
//! the later write wins.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::models::Record;
use crate::models::client::SavedClient;
use crate::models::invoice::Invoice;
use crate::models::settings::AppSettings;
use crate::storage::KeyValueStore;

/// Fixed store keys.
pub mod keys {
    pub const INVOICES: &str = "papertrail_invoices";
    pub const CLIENTS: &str = "papertrail_clients";
    pub const SETTINGS: &str = "papertrail_settings";
    pub const COUNTER: &str = "papertrail_counter";
    pub const DRAFT: &str = "papertrail_draft";
}

/// Persistence layer over a key-value store.
#[derive(Debug)]
pub struct Repository<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S: KeyValueStore> Repository<S> {
    /// Create a repository using the system clock.
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: SystemClock,
        }
    }
}

impl<S: KeyValueStore, C: Clock> Repository<S, C> {
    /// Create a repository with an explicit clock.
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    // ----- invoices -----

    /// All stored invoices, in insertion order.
    pub fn invoices(&self) -> Result<Vec<Invoice>> {
        self.read_collection(keys::INVOICES)
    }

    /// Invoice with the given id.
    pub fn find_invoice(&self, id: &str) -> Result<Option<Invoice>> {
        Ok(self.invoices()?.into_iter().find(|inv| inv.id == id))
    }

    /// Insert or update an invoice by id and return the stored record.
    pub fn save_invoice(&mut self, invoice: &Invoice) -> Result<Invoice> {
        invoice.check_line_items()?;
        self.upsert(keys::INVOICES, invoice)
    }

    /// Remove an invoice. Unknown ids are ignored.
    pub fn delete_invoice(&mut self, id: &str) -> Result<()> {
        self.remove(keys::INVOICES, id)
    }

    /// A new unsaved invoice with a freshly generated number.
    pub fn new_invoice(&mut self) -> Result<Invoice> {
        let settings = self.settings()?;
        let number = self.generate_invoice_number()?;
        Ok(Invoice::new_draft(
            &settings,
            number,
            self.clock.today(),
            self.clock.now(),
        ))
    }

    // ----- clients -----

    /// All stored clients, in insertion order.
    pub fn clients(&self) -> Result<Vec<SavedClient>> {
        self.read_collection(keys::CLIENTS)
    }

    /// Client with the given id.
    pub fn find_client(&self, id: &str) -> Result<Option<SavedClient>> {
        Ok(self.clients()?.into_iter().find(|c| c.id == id))
    }

    /// Validate, then insert or update a client by id.
    pub fn save_client(&mut self, client: &SavedClient) -> Result<SavedClient> {
        client.validate()?;
        self.upsert(keys::CLIENTS, client)
    }

    /// Remove a client. Invoices keep their copy of the client's details.
    pub fn delete_client(&mut self, id: &str) -> Result<()> {
        self.remove(keys::CLIENTS, id)
    }

    // ----- settings -----

    /// Stored settings merged over the defaults.
    pub fn settings(&self) -> Result<AppSettings> {
        let Some(raw) = self.store.get(keys::SETTINGS)? else {
            return Ok(AppSettings::default());
        };

        let settings = serde_json::from_str(&raw)
            .and_then(AppSettings::from_stored)
            .unwrap_or_else(|e| {
                warn!("Ignoring malformed settings record: {}", e);
                AppSettings::default()
            });
        Ok(settings)
    }

    pub fn save_settings(&mut self, settings: &AppSettings) -> Result<()> {
        let json = serde_json::to_string(settings)?;
        self.store.set(keys::SETTINGS, &json)?;
        debug!("Saved settings");
        Ok(())
    }

    /// Drop stored settings so the defaults apply again.
    pub fn reset_settings(&mut self) -> Result<()> {
        self.store.remove(keys::SETTINGS)?;
        debug!("Reset settings to defaults");
        Ok(())
    }

    // ----- numbering -----

    /// Next invoice number, `{prefix}-{year}-{counter:03}`.
    ///
    /// The counter only ever increases, even when invoices are deleted, so
    /// numbers are unique for the lifetime of the store but may have gaps.
    pub fn generate_invoice_number(&mut self) -> Result<String> {
        let settings = self.settings()?;
        let counter = self.counter()? + 1;
        self.store.set(keys::COUNTER, &counter.to_string())?;

        let year = self.clock.today().year();
        let number = format_invoice_number(&settings.invoice_prefix, year, counter);
        debug!("Generated invoice number {}", number);
        Ok(number)
    }

    /// Current counter value; 0 when unset.
    pub fn counter(&self) -> Result<u64> {
        let counter = match self.store.get(keys::COUNTER)? {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!("Ignoring malformed invoice counter: {:?}", raw);
                0
            }),
            None => 0,
        };
        Ok(counter)
    }

    // ----- draft handoff -----

    /// Park an invoice for the next editing session to pick up.
    pub fn stash_draft(&mut self, invoice: &Invoice) -> Result<()> {
        invoice.check_line_items()?;
        let json = serde_json::to_string(invoice)?;
        self.store.set(keys::DRAFT, &json)?;
        Ok(())
    }

    /// Take the parked invoice, if any, removing it from the store.
    pub fn take_draft(&mut self) -> Result<Option<Invoice>> {
        let Some(raw) = self.store.get(keys::DRAFT)? else {
            return Ok(None);
        };
        self.store.remove(keys::DRAFT)?;

        match serde_json::from_str(&raw) {
            Ok(invoice) => Ok(Some(invoice)),
            Err(e) => {
                warn!("Discarding malformed draft: {}", e);
                Ok(None)
            }
        }
    }

    // ----- collection plumbing -----

    /// Read a collection. Missing keys are empty; records that do not parse
    /// are skipped.
    fn read_collection<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        let records = self
            .read_raw(key)?
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping malformed record {} in {}: {}", index, key, e);
                    None
                }
            })
            .collect();
        Ok(records)
    }

    /// Elements of a collection as stored, without interpreting them.
    fn read_raw(&self, key: &str) -> Result<Vec<Value>> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(values) => Ok(values),
            Err(e) => {
                warn!("Ignoring malformed collection {}: {}", key, e);
                Ok(Vec::new())
            }
        }
    }

    fn write_raw(&mut self, key: &str, values: &[Value]) -> Result<()> {
        let json = serde_json::to_string(values)?;
        self.store.set(key, &json)?;
        Ok(())
    }

    /// Replace the record with the same id, or append it.
    ///
    /// Updates refresh `updatedAt` and keep the stored `createdAt`; inserts
    /// set both to now. Other elements are written back untouched, including
    /// ones this build cannot parse.
    fn upsert<T>(&mut self, key: &str, record: &T) -> Result<T>
    where
        T: Record + Clone + Serialize,
    {
        let now = self.clock.now();
        let mut values = self.read_raw(key)?;
        let mut stored = record.clone();
        stored.set_updated_at(now);

        match values.iter().position(|v| value_id(v) == Some(record.id())) {
            Some(index) => {
                let created_at = values[index]
                    .get("createdAt")
                    .and_then(|v| serde_json::from_value::<DateTime<Utc>>(v.clone()).ok())
                    .unwrap_or(now);
                stored.set_created_at(created_at);
                values[index] = serde_json::to_value(&stored)?;
                debug!("Updated {} in {}", record.id(), key);
            }
            None => {
                stored.set_created_at(now);
                values.push(serde_json::to_value(&stored)?);
                debug!("Inserted {} into {}", record.id(), key);
            }
        }

        self.write_raw(key, &values)?;
        Ok(stored)
    }

    fn remove(&mut self, key: &str, id: &str) -> Result<()> {
        let mut values = self.read_raw(key)?;
        let before = values.len();
        values.retain(|v| value_id(v) != Some(id));

        debug!("Deleted {} record(s) with id {} from {}", before - values.len(), id, key);
        self.write_raw(key, &values)
    }
}

fn value_id(value: &Value) -> Option<&str> {
    value.get("id").and_then(Value::as_str)
}

/// Format an invoice number, zero-padding the counter to three digits.
pub fn format_invoice_number(prefix: &str, year: i32, counter: u64) -> String {
    format!("{}-{}-{:03}", prefix, year, counter)
}
