//! Application-wide defaults applied to new invoices.

use serde::{Deserialize, Serialize};

use super::invoice::{Branding, PdfSettings, Template};

/// Default currency of new invoices.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Default invoice number prefix.
pub const DEFAULT_INVOICE_PREFIX: &str = "INV";

/// Default payment terms of new invoices.
pub const DEFAULT_PAYMENT_TERMS: &str = "Net 30";

/// Defaults used when a new invoice is created.
///
/// Stored records may be partial; they are merged over [`AppSettings::default`]
/// when read (see [`crate::merge::merge_defaults`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub default_currency: String,
    pub invoice_prefix: String,
    pub default_template: Template,
    pub default_payment_terms: String,
    pub branding: Branding,
    pub pdf_settings: PdfSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_currency: DEFAULT_CURRENCY.to_string(),
            invoice_prefix: DEFAULT_INVOICE_PREFIX.to_string(),
            default_template: Template::Minimal,
            default_payment_terms: DEFAULT_PAYMENT_TERMS.to_string(),
            branding: Branding::default(),
            pdf_settings: PdfSettings::default(),
        }
    }
}

impl AppSettings {
    /// Build settings from a possibly partial stored JSON object.
    ///
    /// Top-level fields override the defaults one by one, and the nested
    /// `branding` and `pdfSettings` objects are merged independently.
    pub fn from_stored(stored: serde_json::Value) -> Result<Self, serde_json::Error> {
        let mut merged = serde_json::to_value(Self::default())?;
        crate::merge::merge_defaults(&mut merged, stored);
        serde_json::from_value(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let settings = AppSettings::default();
        assert_eq!(settings.default_currency, "USD");
        assert_eq!(settings.invoice_prefix, "INV");
        assert_eq!(settings.default_template, Template::Minimal);
        assert_eq!(settings.branding.primary_color, "#1e7a8c");
        assert_eq!(settings.branding.secondary_color, "#f97316");
        assert!(settings.pdf_settings.fit_to_page);
        assert_eq!(settings.pdf_settings.scale, 1.0);
    }

    #[test]
    fn test_from_stored_overrides_single_field() {
        let settings = AppSettings::from_stored(json!({ "invoicePrefix": "ACME" })).unwrap();

        let expected = AppSettings {
            invoice_prefix: "ACME".to_string(),
            ..AppSettings::default()
        };
        assert_eq!(settings, expected);
    }

    #[test]
    fn test_from_stored_merges_nested_objects_independently() {
        let stored = json!({
            "branding": { "primaryColor": "#000000" },
            "pdfSettings": { "scale": 1.25 }
        });

        let settings = AppSettings::from_stored(stored).unwrap();

        assert_eq!(settings.branding.primary_color, "#000000");
        assert_eq!(settings.branding.secondary_color, "#f97316");
        assert_eq!(settings.branding.footer_text, "Thank you for your business");
        assert_eq!(settings.pdf_settings.scale, 1.25);
        assert!(settings.pdf_settings.fit_to_page);
    }

    #[test]
    fn test_from_stored_rejects_wrong_types() {
        assert!(AppSettings::from_stored(json!({ "defaultTemplate": "gothic" })).is_err());
    }
}
