//! Invoice list queries: search, ordering and summary figures.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::invoice::{Invoice, InvoiceStatus};

/// Ordering of the invoice list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Newest invoice date first.
    #[default]
    Date,
    /// Largest total first.
    Amount,
    /// Status name, alphabetically.
    Status,
}

/// Invoices whose number or client name contains `query`, ignoring case.
pub fn search<'a>(invoices: &'a [Invoice], query: &str) -> Vec<&'a Invoice> {
    let query = query.to_lowercase();
    invoices
        .iter()
        .filter(|inv| {
            inv.number.to_lowercase().contains(&query)
                || inv.client_info.name.to_lowercase().contains(&query)
        })
        .collect()
}

/// Sort invoices in place. Ties keep their existing order.
pub fn sort_invoices(invoices: &mut [&Invoice], by: SortBy) {
    match by {
        SortBy::Date => invoices.sort_by(|a, b| b.date.cmp(&a.date)),
        SortBy::Amount => {
            invoices.sort_by(|a, b| b.totals().total.total_cmp(&a.totals().total))
        }
        SortBy::Status => invoices.sort_by(|a, b| a.status.as_str().cmp(b.status.as_str())),
    }
}

/// Summary figures for the invoice list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Number of invoices.
    pub total: usize,
    /// Invoices dated in the current month.
    pub this_month: usize,
    /// Sum of totals of invoices not yet paid.
    pub outstanding: f64,
}

impl DashboardStats {
    pub fn compute(invoices: &[Invoice], today: NaiveDate) -> Self {
        let this_month = invoices
            .iter()
            .filter(|inv| inv.date.year() == today.year() && inv.date.month() == today.month())
            .count();

        let outstanding = invoices
            .iter()
            .filter(|inv| inv.status != InvoiceStatus::Paid)
            .map(|inv| inv.totals().total)
            .sum();

        Self {
            total: invoices.len(),
            this_month,
            outstanding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use crate::models::client::ClientInfo;
    use crate::models::settings::AppSettings;

    fn invoice(number: &str, client: &str, date: (i32, u32, u32), amount: f64, status: InvoiceStatus) -> Invoice {
        let date = NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap();
        let mut inv = Invoice::new_draft(&AppSettings::default(), number, date, Utc::now());
        inv.client_info = ClientInfo {
            name: client.to_string(),
            ..ClientInfo::default()
        };
        let id = inv.line_items()[0].id.clone();
        inv.update_line_item(&id, |item| item.unit_price = amount).unwrap();
        inv.status = status;
        inv
    }

    fn sample() -> Vec<Invoice> {
        vec![
            invoice("INV-2024-001", "Acme", (2024, 3, 2), 100.0, InvoiceStatus::Paid),
            invoice("INV-2024-002", "Globex", (2024, 4, 10), 250.0, InvoiceStatus::Sent),
            invoice("INV-2024-003", "Initech", (2024, 4, 1), 75.0, InvoiceStatus::Draft),
        ]
    }

    fn numbers(invoices: &[&Invoice]) -> Vec<String> {
        invoices.iter().map(|inv| inv.number.clone()).collect()
    }

    #[test]
    fn test_search_number_or_client() {
        let invoices = sample();
        assert_eq!(numbers(&search(&invoices, "globex")), vec!["INV-2024-002"]);
        assert_eq!(numbers(&search(&invoices, "inv-2024-00")).len(), 3);
        assert_eq!(numbers(&search(&invoices, "003")), vec!["INV-2024-003"]);
        assert!(search(&invoices, "nobody").is_empty());
    }

    #[test]
    fn test_sort_orders() {
        let invoices = sample();
        let mut list: Vec<&Invoice> = invoices.iter().collect();

        sort_invoices(&mut list, SortBy::Date);
        assert_eq!(numbers(&list), vec!["INV-2024-002", "INV-2024-003", "INV-2024-001"]);

        sort_invoices(&mut list, SortBy::Amount);
        assert_eq!(numbers(&list), vec!["INV-2024-002", "INV-2024-001", "INV-2024-003"]);

        sort_invoices(&mut list, SortBy::Status);
        assert_eq!(numbers(&list), vec!["INV-2024-003", "INV-2024-001", "INV-2024-002"]);
    }

    #[test]
    fn test_stats() {
        let invoices = sample();
        let today = NaiveDate::from_ymd_opt(2024, 4, 20).unwrap();

        let stats = DashboardStats::compute(&invoices, today);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.this_month, 2);
        assert_eq!(stats.outstanding, 325.0);
    }
}
