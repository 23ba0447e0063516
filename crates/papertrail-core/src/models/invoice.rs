//! Invoice data models.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Record;
use super::client::{ClientInfo, SavedClient};
use super::settings::AppSettings;
use crate::error::{InvoiceError, ValidationError};
use crate::totals::{self, InvoiceTotals};

/// Days between the invoice date and the due date of a new draft.
pub const DEFAULT_DUE_DAYS: u64 = 30;

/// Bounds of the PDF scale factor.
pub const MIN_PDF_SCALE: f64 = 0.5;
pub const MAX_PDF_SCALE: f64 = 1.5;

/// A complete invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// Immutable identifier.
    pub id: String,

    /// Human-facing invoice number (e.g. `INV-2024-001`).
    pub number: String,

    /// Optional project title.
    #[serde(default)]
    pub title: String,

    /// Client snapshot, copied when the client was picked.
    #[serde(default)]
    pub client_info: ClientInfo,

    /// Billable rows, never empty.
    items: Vec<LineItem>,

    /// ISO 4217 currency code.
    pub currency: String,

    /// Issue date.
    pub date: NaiveDate,

    /// Payment due date.
    pub due_date: NaiveDate,

    #[serde(default)]
    pub payment_terms: String,

    #[serde(default)]
    pub payment_instructions: String,

    #[serde(default)]
    pub notes: String,

    #[serde(default)]
    pub status: InvoiceStatus,

    /// Visual template used by the preview.
    #[serde(default)]
    pub template: Template,

    #[serde(default)]
    pub branding: Branding,

    /// Which optional columns the templates render.
    #[serde(default)]
    pub settings: DisplaySettings,

    #[serde(default)]
    pub pdf_settings: PdfSettings,

    /// Tax rate in percent (0-100).
    #[serde(default)]
    pub tax_rate: f64,

    #[serde(default)]
    pub attachments: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single billable row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: String,

    #[serde(default)]
    pub description: String,

    pub quantity: f64,

    pub unit_price: f64,

    /// Percent or absolute amount, depending on `discount_type`.
    #[serde(default)]
    pub discount: f64,

    #[serde(default)]
    pub discount_type: DiscountType,
}

/// How a line item's discount is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// Discount is a percentage of the gross amount.
    #[default]
    Percentage,
    /// Discount is an absolute amount.
    Fixed,
}

/// Invoice lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Overdue,
}

/// Visual template of the rendered invoice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    #[default]
    Minimal,
    Professional,
    Modern,
}

/// Logo, colors and footer of an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Branding {
    /// Data URL of the uploaded logo, stored verbatim.
    pub logo: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub background_color: String,
    pub footer_text: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            logo: String::new(),
            primary_color: "#1e7a8c".to_string(),
            secondary_color: "#f97316".to_string(),
            background_color: "#ffffff".to_string(),
            footer_text: "Thank you for your business".to_string(),
        }
    }
}

impl Branding {
    /// Overwrite the three colors with a preset, keeping logo and footer.
    pub fn apply_theme(&mut self, theme: ColorTheme) {
        let (primary, secondary, background) = theme.colors();
        self.primary_color = primary.to_string();
        self.secondary_color = secondary.to_string();
        self.background_color = background.to_string();
    }
}

/// Optional columns shown by the templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplaySettings {
    pub show_discount: bool,
    pub show_tax: bool,
    pub compact_mode: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_discount: true,
            show_tax: true,
            compact_mode: false,
        }
    }
}

/// PDF export options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PdfSettings {
    pub fit_to_page: bool,

    /// Scale factor (0.5 - 1.5).
    pub scale: f64,
}

impl PdfSettings {
    /// Set the scale factor, clamped to the supported range.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale.clamp(MIN_PDF_SCALE, MAX_PDF_SCALE);
    }
}

impl Default for PdfSettings {
    fn default() -> Self {
        Self {
            fit_to_page: true,
            scale: 1.0,
        }
    }
}

/// Preset branding color themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorTheme {
    Default,
    Dark,
    PinkHell,
    BlueNight,
    GreenGrass,
}

impl ColorTheme {
    /// All presets, in display order.
    pub const ALL: [ColorTheme; 5] = [
        ColorTheme::Default,
        ColorTheme::Dark,
        ColorTheme::PinkHell,
        ColorTheme::BlueNight,
        ColorTheme::GreenGrass,
    ];

    /// Primary, secondary and background colors of the preset.
    pub fn colors(&self) -> (&'static str, &'static str, &'static str) {
        match self {
            ColorTheme::Default => ("#2563eb", "#3b82f6", "#ffffff"),
            ColorTheme::Dark => ("#3b82f6", "#60a5fa", "#1f2937"),
            ColorTheme::PinkHell => ("#dc2626", "#fb7185", "#fef2f2"),
            ColorTheme::BlueNight => ("#1e40af", "#3b82f6", "#dbeafe"),
            ColorTheme::GreenGrass => ("#16a34a", "#4ade80", "#f0fdf4"),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColorTheme::Default => "default",
            ColorTheme::Dark => "dark",
            ColorTheme::PinkHell => "pinkHell",
            ColorTheme::BlueNight => "blueNight",
            ColorTheme::GreenGrass => "greenGrass",
        }
    }

    /// Look up a preset by its camelCase name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|theme| theme.name() == name)
    }
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(InvoiceStatus::Draft),
            "sent" => Ok(InvoiceStatus::Sent),
            "paid" => Ok(InvoiceStatus::Paid),
            "overdue" => Ok(InvoiceStatus::Overdue),
            _ => Err(ValidationError::InvalidValue {
                field: "status",
                value: s.to_string(),
            }),
        }
    }
}

impl std::str::FromStr for Template {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "minimal" => Ok(Template::Minimal),
            "professional" => Ok(Template::Professional),
            "modern" => Ok(Template::Modern),
            _ => Err(ValidationError::InvalidValue {
                field: "template",
                value: s.to_string(),
            }),
        }
    }
}

impl LineItem {
    /// A blank row: quantity 1, no price, no discount.
    pub fn new() -> Self {
        Self {
            id: super::new_id(),
            description: String::new(),
            quantity: 1.0,
            unit_price: 0.0,
            discount: 0.0,
            discount_type: DiscountType::Percentage,
        }
    }

    /// Net amount of this row after discount.
    pub fn total(&self) -> f64 {
        totals::line_total(self)
    }
}

impl Default for LineItem {
    fn default() -> Self {
        Self::new()
    }
}

impl Invoice {
    /// Create an unsaved draft with defaults taken from the application settings.
    pub fn new_draft(
        settings: &AppSettings,
        number: impl Into<String>,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Self {
        let due_date = today
            .checked_add_days(Days::new(DEFAULT_DUE_DAYS))
            .unwrap_or(today);

        Self {
            id: super::new_id(),
            number: number.into(),
            title: String::new(),
            client_info: ClientInfo::default(),
            items: vec![LineItem::new()],
            currency: settings.default_currency.clone(),
            date: today,
            due_date,
            payment_terms: settings.default_payment_terms.clone(),
            payment_instructions: String::new(),
            notes: String::new(),
            status: InvoiceStatus::Draft,
            template: settings.default_template,
            branding: settings.branding.clone(),
            settings: DisplaySettings::default(),
            pdf_settings: settings.pdf_settings.clone(),
            tax_rate: 0.0,
            attachments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Records read from elsewhere can arrive without items; those are not
    /// accepted for saving.
    pub fn check_line_items(&self) -> Result<(), InvoiceError> {
        if self.items.is_empty() {
            return Err(InvoiceError::NoLineItems);
        }
        Ok(())
    }

    /// Line items in display order.
    pub fn line_items(&self) -> &[LineItem] {
        &self.items
    }

    /// Append a blank line item and return it for editing.
    pub fn add_line_item(&mut self) -> &mut LineItem {
        self.items.push(LineItem::new());
        let last = self.items.len() - 1;
        &mut self.items[last]
    }

    /// Mutable access to the line item with the given id.
    pub fn line_item_mut(&mut self, id: &str) -> Result<&mut LineItem, InvoiceError> {
        self.items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| InvoiceError::LineItemNotFound(id.to_string()))
    }

    /// Apply `update` to the line item with the given id.
    pub fn update_line_item<F>(&mut self, id: &str, update: F) -> Result<(), InvoiceError>
    where
        F: FnOnce(&mut LineItem),
    {
        update(self.line_item_mut(id)?);
        Ok(())
    }

    /// Remove a line item. The last remaining item cannot be removed.
    pub fn remove_line_item(&mut self, id: &str) -> Result<LineItem, InvoiceError> {
        if self.items.len() == 1 {
            return Err(InvoiceError::LastLineItem);
        }

        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| InvoiceError::LineItemNotFound(id.to_string()))?;

        Ok(self.items.remove(index))
    }

    /// Copy a saved client's details into this invoice.
    pub fn set_client(&mut self, client: &SavedClient) {
        self.client_info = client.to_client_info();
    }

    /// Overwrite the branding colors with a preset.
    pub fn apply_color_theme(&mut self, theme: ColorTheme) {
        self.branding.apply_theme(theme);
    }

    /// Set the PDF scale factor, clamped to the supported range.
    pub fn set_pdf_scale(&mut self, scale: f64) {
        self.pdf_settings.set_scale(scale);
    }

    /// Copy of this invoice under a new id, marked as a draft.
    pub fn duplicate(&self) -> Self {
        Self {
            id: super::new_id(),
            number: format!("{}-COPY", self.number),
            status: InvoiceStatus::Draft,
            ..self.clone()
        }
    }

    /// Subtotal, tax and total of this invoice.
    pub fn totals(&self) -> InvoiceTotals {
        totals::invoice_totals(&self.items, self.tax_rate)
    }
}

impl Record for Invoice {
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

    fn draft() -> Invoice {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let now = today.and_hms_opt(9, 30, 0).unwrap().and_utc();
        Invoice::new_draft(&AppSettings::default(), "INV-2024-001", today, now)
    }

    #[test]
    fn test_new_draft_takes_settings_defaults() {
        let mut settings = AppSettings::default();
        settings.default_currency = "EUR".to_string();
        settings.default_template = Template::Modern;
        settings.default_payment_terms = "Net 14".to_string();

        let today = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();
        let now = today.and_hms_opt(0, 0, 0).unwrap().and_utc();
        let invoice = Invoice::new_draft(&settings, "INV-2024-007", today, now);

        assert_eq!(invoice.number, "INV-2024-007");
        assert_eq!(invoice.currency, "EUR");
        assert_eq!(invoice.template, Template::Modern);
        assert_eq!(invoice.payment_terms, "Net 14");
        assert_eq!(invoice.status, InvoiceStatus::Draft);
        assert_eq!(invoice.due_date, NaiveDate::from_ymd_opt(2024, 2, 19).unwrap());
        assert_eq!(invoice.tax_rate, 0.0);
        assert_eq!(invoice.line_items().len(), 1);
        assert_eq!(invoice.line_items()[0].quantity, 1.0);
        assert_eq!(invoice.line_items()[0].discount_type, DiscountType::Percentage);
        assert_eq!(invoice.created_at, invoice.updated_at);
    }

    #[test]
    fn test_last_line_item_cannot_be_removed() {
        let mut invoice = draft();
        let only = invoice.line_items()[0].id.clone();

        assert_eq!(invoice.remove_line_item(&only), Err(InvoiceError::LastLineItem));
        assert_eq!(invoice.line_items().len(), 1);
    }

    #[test]
    fn test_remove_line_item_removes_only_target() {
        let mut invoice = draft();
        let first = invoice.line_items()[0].id.clone();
        let second = invoice.add_line_item().id.clone();
        let third = invoice.add_line_item().id.clone();

        let removed = invoice.remove_line_item(&second).unwrap();

        assert_eq!(removed.id, second);
        let remaining: Vec<&str> = invoice.line_items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(remaining, vec![first.as_str(), third.as_str()]);
    }

    #[test]
    fn test_remove_unknown_line_item() {
        let mut invoice = draft();
        invoice.add_line_item();

        assert_eq!(
            invoice.remove_line_item("missing"),
            Err(InvoiceError::LineItemNotFound("missing".to_string()))
        );
        assert_eq!(invoice.line_items().len(), 2);
    }

    #[test]
    fn test_update_line_item_and_totals() {
        let mut invoice = draft();
        let id = invoice.line_items()[0].id.clone();
        invoice
            .update_line_item(&id, |item| {
                item.description = "Design work".to_string();
                item.quantity = 4.0;
                item.unit_price = 50.0;
            })
            .unwrap();
        invoice.tax_rate = 10.0;

        let totals = invoice.totals();
        assert_eq!(totals.subtotal, 200.0);
        assert_eq!(totals.tax, 20.0);
        assert_eq!(totals.total, 220.0);
    }

    #[test]
    fn test_duplicate_gets_new_identity() {
        let mut invoice = draft();
        invoice.status = InvoiceStatus::Paid;

        let copy = invoice.duplicate();

        assert_ne!(copy.id, invoice.id);
        assert_eq!(copy.number, "INV-2024-001-COPY");
        assert_eq!(copy.status, InvoiceStatus::Draft);
        assert_eq!(copy.line_items(), invoice.line_items());
    }

    #[test]
    fn test_color_theme_and_pdf_scale() {
        let mut invoice = draft();
        invoice.apply_color_theme(ColorTheme::from_name("dark").unwrap());
        assert_eq!(invoice.branding.primary_color, "#3b82f6");
        assert_eq!(invoice.branding.background_color, "#1f2937");
        assert_eq!(invoice.branding.footer_text, "Thank you for your business");

        invoice.set_pdf_scale(3.0);
        assert_eq!(invoice.pdf_settings.scale, MAX_PDF_SCALE);
        invoice.set_pdf_scale(0.1);
        assert_eq!(invoice.pdf_settings.scale, MIN_PDF_SCALE);
    }

    #[test]
    fn test_record_without_items_is_flagged() {
        let mut json = serde_json::to_value(draft()).unwrap();
        json["items"] = serde_json::json!([]);
        let invoice: Invoice = serde_json::from_value(json).unwrap();

        assert_eq!(invoice.check_line_items(), Err(InvoiceError::NoLineItems));
        assert_eq!(draft().check_line_items(), Ok(()));
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("Paid".parse::<InvoiceStatus>(), Ok(InvoiceStatus::Paid));
        assert!("void".parse::<InvoiceStatus>().is_err());
        assert_eq!("modern".parse::<Template>(), Ok(Template::Modern));
    }

    #[test]
    fn test_reads_browser_record() {
        let json = r##"{
            "id": "0b6c1f2e-8d1a-4a57-9f7e-2f1d5c3b9a10",
            "number": "INV-2024-003",
            "title": "",
            "clientInfo": {"name": "Jane", "email": "jane@example.com", "address": "", "phone": "", "company": "", "taxId": ""},
            "items": [{"id": "a", "description": "Consulting", "quantity": 2, "unitPrice": 150, "discount": 10, "discountType": "fixed"}],
            "currency": "USD",
            "date": "2024-05-01",
            "dueDate": "2024-05-31",
            "paymentTerms": "Net 30",
            "paymentInstructions": "",
            "notes": "",
            "status": "sent",
            "template": "professional",
            "branding": {"logo": "", "primaryColor": "#000000", "secondaryColor": "#111111", "backgroundColor": "#ffffff", "footerText": ""},
            "settings": {"showDiscount": true, "showTax": false, "compactMode": false},
            "pdfSettings": {"fitToPage": false, "scale": 0.8},
            "taxRate": 5,
            "attachments": [],
            "createdAt": "2024-05-01T08:00:00.000Z",
            "updatedAt": "2024-05-02T08:00:00.000Z"
        }"##;

        let invoice: Invoice = serde_json::from_str(json).unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Sent);
        assert_eq!(invoice.template, Template::Professional);
        assert_eq!(invoice.line_items()[0].discount_type, DiscountType::Fixed);
        assert_eq!(invoice.totals().subtotal, 290.0);
        assert!(!invoice.settings.show_tax);
    }
}
