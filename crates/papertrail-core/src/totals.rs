//! Invoice totals.
//!
//! Plain `f64` arithmetic with no rounding; rounding happens only when an
//! amount is formatted for display. Negative inputs and discounts larger than
//! the gross amount are propagated as-is.

use serde::{Deserialize, Serialize};

use crate::models::invoice::{DiscountType, LineItem};

/// Invoice-level totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Sum of line totals.
    pub subtotal: f64,
    /// Tax on the subtotal.
    pub tax: f64,
    /// Subtotal plus tax.
    pub total: f64,
}

/// Net amount of a line item after its discount.
///
/// A fixed discount larger than the gross amount yields a negative total.
pub fn line_total(item: &LineItem) -> f64 {
    let gross = item.quantity * item.unit_price;
    let discount = match item.discount_type {
        DiscountType::Percentage => gross * (item.discount / 100.0),
        DiscountType::Fixed => item.discount,
    };
    gross - discount
}

/// Subtotal, tax and total for a set of line items at `tax_rate` percent.
pub fn invoice_totals(items: &[LineItem], tax_rate: f64) -> InvoiceTotals {
    let subtotal: f64 = items.iter().map(line_total).sum();
    let tax = subtotal * (tax_rate / 100.0);

    InvoiceTotals {
        subtotal,
        tax,
        total: subtotal + tax,
    }
}
