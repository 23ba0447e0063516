//! WASM bindings for the papertrail invoice builder.
//!
//! Records cross the boundary as plain JS objects in the same camelCase
//! shape they are stored in, so a page can hand them straight to its forms.

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::debug;
use wasm_bindgen::prelude::*;

use papertrail_core::storage::Result as StoreResult;
use papertrail_core::{
    AppSettings, ClientInfo, Clock, DashboardStats, EditingSession, Invoice, KeyValueStore,
    LineItem, Repository, SavedClient, SortBy, StorageError, SystemClock, search, sort_invoices,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Net amount of one line item after discount.
#[wasm_bindgen(js_name = lineTotal)]
pub fn line_total(item: JsValue) -> Result<f64, JsValue> {
    let item: LineItem = from_js(item)?;
    Ok(papertrail_core::line_total(&item))
}

/// `{ subtotal, tax, total }` of a list of line items.
#[wasm_bindgen(js_name = invoiceTotals)]
pub fn invoice_totals(items: JsValue, tax_rate: f64) -> Result<JsValue, JsValue> {
    let items: Vec<LineItem> = from_js(items)?;
    to_js(&papertrail_core::invoice_totals(&items, tax_rate))
}

/// Format an amount for display in the given currency.
#[wasm_bindgen(js_name = formatCurrency)]
pub fn format_currency(amount: f64, currency: &str) -> String {
    papertrail_core::format_currency(amount, currency)
}

/// `localStorage`-backed store.
#[derive(Clone)]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    /// The window's `localStorage`. Fails when there is no window or
    /// storage is disabled.
    pub fn open() -> StoreResult<Self> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("no window".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| StorageError::Unavailable(describe(&e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage is disabled".to_string()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| StorageError::Backend(describe(&e)))
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        // Quota errors surface here.
        self.storage
            .set_item(key, value)
            .map_err(|e| StorageError::Backend(describe(&e)))
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| StorageError::Backend(describe(&e)))
    }
}

type BrowserRepository = Repository<LocalStorage>;

/// Client form data as sent by the page.
#[derive(Deserialize)]
struct ClientInput {
    id: Option<String>,
    #[serde(flatten)]
    info: ClientInfo,
}

/// Invoices, clients and settings kept in `localStorage`.
#[wasm_bindgen]
pub struct Papertrail {
    repo: BrowserRepository,
}

#[wasm_bindgen]
impl Papertrail {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<Papertrail, JsValue> {
        Ok(Self {
            repo: open_repository()?,
        })
    }

    /// All saved invoices.
    pub fn invoices(&self) -> Result<JsValue, JsValue> {
        to_js(&self.repo.invoices().map_err(js_err)?)
    }

    /// The invoice with `id`, or `null`.
    #[wasm_bindgen(js_name = findInvoice)]
    pub fn find_invoice(&self, id: &str) -> Result<JsValue, JsValue> {
        to_js(&self.repo.find_invoice(id).map_err(js_err)?)
    }

    /// Insert or update an invoice, returning the stored record.
    #[wasm_bindgen(js_name = saveInvoice)]
    pub fn save_invoice(&mut self, invoice: JsValue) -> Result<JsValue, JsValue> {
        let invoice: Invoice = from_js(invoice)?;
        to_js(&self.repo.save_invoice(&invoice).map_err(js_err)?)
    }

    #[wasm_bindgen(js_name = deleteInvoice)]
    pub fn delete_invoice(&mut self, id: &str) -> Result<(), JsValue> {
        self.repo.delete_invoice(id).map_err(js_err)
    }

    /// An unsaved draft carrying the next invoice number.
    #[wasm_bindgen(js_name = newInvoice)]
    pub fn new_invoice(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.repo.new_invoice().map_err(js_err)?)
    }

    /// Copy an invoice into the draft slot for the next editor.
    #[wasm_bindgen(js_name = duplicateInvoice)]
    pub fn duplicate_invoice(&mut self, id: &str) -> Result<JsValue, JsValue> {
        let invoice = self
            .repo
            .find_invoice(id)
            .map_err(js_err)?
            .ok_or_else(|| JsValue::from_str(&format!("invoice not found: {}", id)))?;
        let copy = invoice.duplicate();
        self.repo.stash_draft(&copy).map_err(js_err)?;
        to_js(&copy)
    }

    #[wasm_bindgen(js_name = stashDraft)]
    pub fn stash_draft(&mut self, invoice: JsValue) -> Result<(), JsValue> {
        let invoice: Invoice = from_js(invoice)?;
        self.repo.stash_draft(&invoice).map_err(js_err)
    }

    /// The parked draft, or `null`. Taking it clears the slot.
    #[wasm_bindgen(js_name = takeDraft)]
    pub fn take_draft(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.repo.take_draft().map_err(js_err)?)
    }

    #[wasm_bindgen(js_name = generateInvoiceNumber)]
    pub fn generate_invoice_number(&mut self) -> Result<String, JsValue> {
        self.repo.generate_invoice_number().map_err(js_err)
    }

    pub fn clients(&self) -> Result<JsValue, JsValue> {
        to_js(&self.repo.clients().map_err(js_err)?)
    }

    #[wasm_bindgen(js_name = findClient)]
    pub fn find_client(&self, id: &str) -> Result<JsValue, JsValue> {
        to_js(&self.repo.find_client(id).map_err(js_err)?)
    }

    /// Insert or update a client. Name and email are required.
    ///
    /// Accepts a bare contact object; an `id` selects the client to update.
    #[wasm_bindgen(js_name = saveClient)]
    pub fn save_client(&mut self, client: JsValue) -> Result<JsValue, JsValue> {
        let input: ClientInput = from_js(client)?;
        let existing = match &input.id {
            Some(id) => self.repo.find_client(id).map_err(js_err)?,
            None => None,
        };

        let client = match existing {
            Some(mut client) => {
                client.info = input.info;
                client
            }
            None => SavedClient::new(input.info),
        };
        to_js(&self.repo.save_client(&client).map_err(js_err)?)
    }

    #[wasm_bindgen(js_name = deleteClient)]
    pub fn delete_client(&mut self, id: &str) -> Result<(), JsValue> {
        self.repo.delete_client(id).map_err(js_err)
    }

    /// Stored settings merged over the defaults.
    pub fn settings(&self) -> Result<JsValue, JsValue> {
        to_js(&self.repo.settings().map_err(js_err)?)
    }

    #[wasm_bindgen(js_name = saveSettings)]
    pub fn save_settings(&mut self, settings: JsValue) -> Result<(), JsValue> {
        let settings: AppSettings = from_js(settings)?;
        self.repo.save_settings(&settings).map_err(js_err)
    }

    #[wasm_bindgen(js_name = resetSettings)]
    pub fn reset_settings(&mut self) -> Result<(), JsValue> {
        self.repo.reset_settings().map_err(js_err)
    }

    /// Invoices matching `query`, ordered by `sort` ("date", "amount" or "status").
    pub fn search(&self, query: &str, sort: Option<String>) -> Result<JsValue, JsValue> {
        let sort_by = match sort.as_deref() {
            None | Some("date") => SortBy::Date,
            Some("amount") => SortBy::Amount,
            Some("status") => SortBy::Status,
            Some(other) => return Err(JsValue::from_str(&format!("unknown sort: {}", other))),
        };

        let invoices = self.repo.invoices().map_err(js_err)?;
        let mut found = search(&invoices, query);
        sort_invoices(&mut found, sort_by);
        to_js(&found)
    }

    /// `{ total, thisMonth, outstanding }` over all invoices.
    pub fn stats(&self) -> Result<JsValue, JsValue> {
        let invoices = self.repo.invoices().map_err(js_err)?;
        to_js(&DashboardStats::compute(&invoices, self.repo.clock().today()))
    }

    /// Start editing an invoice: the one with `id`, else the parked draft,
    /// else a new one.
    #[wasm_bindgen(js_name = openEditor)]
    pub fn open_editor(&self, id: Option<String>) -> Result<InvoiceEditor, JsValue> {
        let session = EditingSession::open(open_repository()?, id.as_deref()).map_err(js_err)?;
        Ok(InvoiceEditor { session })
    }
}

/// An invoice being edited, saved automatically after a quiet period.
///
/// The page calls `poll()` from a timer; nothing is saved between polls.
#[wasm_bindgen]
pub struct InvoiceEditor {
    session: EditingSession<LocalStorage, SystemClock>,
}

#[wasm_bindgen]
impl InvoiceEditor {
    pub fn invoice(&self) -> Result<JsValue, JsValue> {
        to_js(self.session.invoice())
    }

    pub fn totals(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.invoice().totals())
    }

    /// Replace the edited invoice with a form's state. The id is kept.
    pub fn update(&mut self, invoice: JsValue) -> Result<(), JsValue> {
        let mut invoice: Invoice = from_js(invoice)?;
        self.session.try_edit(|current| {
            invoice.check_line_items().map_err(js_err)?;
            invoice.id = current.id.clone();
            *current = invoice;
            Ok(())
        })
    }

    /// Append a blank line item and return its id.
    #[wasm_bindgen(js_name = addLineItem)]
    pub fn add_line_item(&mut self) -> String {
        self.session.edit(|invoice| invoice.add_line_item().id.clone())
    }

    /// Overwrite the line item with the same id.
    #[wasm_bindgen(js_name = setLineItem)]
    pub fn set_line_item(&mut self, item: JsValue) -> Result<(), JsValue> {
        let item: LineItem = from_js(item)?;
        let id = item.id.clone();
        self.session.try_edit(|invoice| {
            *invoice.line_item_mut(&id).map_err(js_err)? = item;
            Ok(())
        })
    }

    /// Remove a line item. Fails for the last remaining one.
    #[wasm_bindgen(js_name = removeLineItem)]
    pub fn remove_line_item(&mut self, id: &str) -> Result<(), JsValue> {
        self.session
            .try_edit(|invoice| invoice.remove_line_item(id))
            .map(|_| ())
            .map_err(js_err)
    }

    /// Copy a saved client's details into the invoice.
    #[wasm_bindgen(js_name = setClient)]
    pub fn set_client(&mut self, client_id: &str) -> Result<(), JsValue> {
        let client = self
            .session
            .repository()
            .find_client(client_id)
            .map_err(js_err)?
            .ok_or_else(|| JsValue::from_str(&format!("client not found: {}", client_id)))?;
        self.session.edit(|invoice| invoice.set_client(&client));
        Ok(())
    }

    /// Apply a preset color theme ("default", "dark", "pinkHell", ...).
    #[wasm_bindgen(js_name = applyTheme)]
    pub fn apply_theme(&mut self, name: &str) -> Result<(), JsValue> {
        let theme = papertrail_core::ColorTheme::from_name(name)
            .ok_or_else(|| JsValue::from_str(&format!("unknown theme: {}", name)))?;
        self.session.edit(|invoice| invoice.apply_color_theme(theme));
        Ok(())
    }

    #[wasm_bindgen(js_name = setPdfScale)]
    pub fn set_pdf_scale(&mut self, scale: f64) {
        self.session.edit(|invoice| invoice.set_pdf_scale(scale));
    }

    /// Save if the auto-save is due. Returns whether a save happened.
    pub fn poll(&mut self) -> Result<bool, JsValue> {
        self.session.poll().map_err(js_err)
    }

    /// Save right away and return the stored record.
    #[wasm_bindgen(js_name = saveNow)]
    pub fn save_now(&mut self) -> Result<JsValue, JsValue> {
        let saved = self.session.save_now().map_err(js_err)?;
        to_js(saved)
    }

    /// Epoch milliseconds at which the pending auto-save is due, if any.
    #[wasm_bindgen(js_name = pendingDue)]
    pub fn pending_due(&self) -> Option<f64> {
        self.session
            .pending()
            .map(|pending| pending.due().timestamp_millis() as f64)
    }

    /// Drop the pending auto-save without saving.
    pub fn discard(&mut self) {
        self.session.discard();
    }
}

fn open_repository() -> Result<BrowserRepository, JsValue> {
    let store = LocalStorage::open().map_err(js_err)?;
    debug!("Opened localStorage store");
    Ok(Repository::new(store))
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
