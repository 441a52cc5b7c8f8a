//! Cache key generation utilities
//!
//! Search keys are built from a canonical rendering of the criteria: field
//! names in a fixed (sorted) order, values trimmed and normalized, so two
//! logically equal criteria always share a key no matter how they were built.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::models::InvoiceCriteria;

/// `active=true;date_from=2024-01-01;invoice_number=c300` (empty string for
/// no filters).
pub fn canonical_criteria(criteria: &InvoiceCriteria) -> String {
    let mut fields: BTreeMap<&'static str, String> = BTreeMap::new();

    if let Some(number) = normalized_text(criteria.invoice_number.as_deref()) {
        // matched case-insensitively, so the key ignores case too
        fields.insert("invoice_number", number.to_lowercase());
    }
    if let Some(status) = normalized_text(criteria.status.as_deref()) {
        fields.insert("status", status.to_string());
    }
    if let Some(from) = criteria.date_from {
        fields.insert("date_from", format_date(from));
    }
    if let Some(to) = criteria.date_to {
        fields.insert("date_to", format_date(to));
    }
    if let Some(min) = criteria.min_amount {
        fields.insert("min_amount", min.normalize().to_string());
    }
    if let Some(max) = criteria.max_amount {
        fields.insert("max_amount", max.normalize().to_string());
    }
    if let Some(active) = criteria.active.as_bool() {
        fields.insert("active", active.to_string());
    }

    fields
        .iter()
        .map(|(name, value)| format!("{}={}", name, escape_value(value)))
        .collect::<Vec<_>>()
        .join(";")
}

/// Generate cache key for a filtered search
pub fn invoice_search(criteria: &InvoiceCriteria) -> String {
    format!("invoices_search:{}", canonical_criteria(criteria))
}

/// Generate cache key for one page of a filtered search
pub fn invoice_page(criteria: &InvoiceCriteria, page: i64, per_page: i64) -> String {
    format!(
        "invoices_page_{}_{}:{}",
        page,
        per_page,
        canonical_criteria(criteria)
    )
}

/// Generate cache key for a filtered count
pub fn invoice_count(criteria: &InvoiceCriteria) -> String {
    format!("invoices_count:{}", canonical_criteria(criteria))
}

pub fn invoices_all() -> String {
    "invoices_all".to_string()
}

pub fn invoice_number(number: &str) -> String {
    format!("invoice_number:{}", number.trim())
}

pub fn invoices_status(status: &str) -> String {
    format!("invoices_status:{}", status.trim())
}

pub fn invoices_date_range(start: NaiveDate, end: NaiveDate) -> String {
    format!("invoices_date_range:{}_{}", format_date(start), format_date(end))
}

pub fn invoices_month(year: i32, month: u32) -> String {
    format!("invoices_month:{}_{:02}", year, month)
}

pub fn invoices_year(year: i32) -> String {
    format!("invoices_year:{}", year)
}

pub fn invoices_active(active: bool) -> String {
    if active {
        "invoices_active".to_string()
    } else {
        "invoices_inactive".to_string()
    }
}

pub fn invoices_high_value() -> String {
    "invoices_high_value".to_string()
}

pub fn invoices_low_value() -> String {
    "invoices_low_value".to_string()
}

pub fn invoices_count_all() -> String {
    "invoices_count".to_string()
}

pub fn invoices_total_amount() -> String {
    "invoices_total_amount".to_string()
}

fn normalized_text(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// Keeps `;` and `=` inside values from forging another field
fn escape_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace('=', "\\=")
}
