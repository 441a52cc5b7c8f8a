//! Filtros de búsqueda de facturas.
//!
//! `SearchParams` is the raw key/value input handed over by the request
//! layer. `InvoiceCriteria` is its typed counterpart; building one never
//! fails, values that do not parse are simply left unset (the validator is
//! expected to have rejected them first).

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

// ============================================================================
// RAW REQUEST PARAMETERS
// ============================================================================

/// Filter fields exactly as received. Blank values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchParams {
    pub invoice_number: Option<String>,
    pub status: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub min_amount: Option<String>,
    pub max_amount: Option<String>,
    pub active: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl SearchParams {
    /// Build from any key/value source. Unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = SearchParams::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "invoice_number" => &mut params.invoice_number,
                "status" => &mut params.status,
                "date_from" => &mut params.date_from,
                "date_to" => &mut params.date_to,
                "min_amount" => &mut params.min_amount,
                "max_amount" => &mut params.max_amount,
                "active" => &mut params.active,
                "page" => &mut params.page,
                "per_page" => &mut params.per_page,
                _ => continue,
            };
            *slot = Some(value.into());
        }
        params
    }

    pub fn from_map(map: &HashMap<String, String>) -> Self {
        Self::from_pairs(map.iter().map(|(k, v)| (k.as_str(), v.clone())))
    }

    pub fn invoice_number(&self) -> Option<&str> {
        present(&self.invoice_number)
    }

    pub fn status(&self) -> Option<&str> {
        present(&self.status)
    }

    pub fn date_from(&self) -> Option<&str> {
        present(&self.date_from)
    }

    pub fn date_to(&self) -> Option<&str> {
        present(&self.date_to)
    }

    pub fn min_amount(&self) -> Option<&str> {
        present(&self.min_amount)
    }

    pub fn max_amount(&self) -> Option<&str> {
        present(&self.max_amount)
    }

    pub fn active(&self) -> Option<&str> {
        present(&self.active)
    }

    /// Page number as sent; non-numeric input is treated as absent.
    pub fn page(&self) -> Option<i64> {
        present(&self.page).and_then(|v| v.parse().ok())
    }

    pub fn per_page(&self) -> Option<i64> {
        present(&self.per_page).and_then(|v| v.parse().ok())
    }

    /// True when no filter field is present (paging fields are ignored).
    pub fn has_no_filters(&self) -> bool {
        self.invoice_number().is_none()
            && self.status().is_none()
            && self.date_from().is_none()
            && self.date_to().is_none()
            && self.min_amount().is_none()
            && self.max_amount().is_none()
            && self.active().is_none()
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// ============================================================================
// TYPED CRITERIA
// ============================================================================

/// Tri-state `active` filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ActiveFilter {
    #[default]
    Any,
    Active,
    Inactive,
}

impl ActiveFilter {
    /// Accepts `true`/`false` in any letter case.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("true") {
            Some(ActiveFilter::Active)
        } else if raw.eq_ignore_ascii_case("false") {
            Some(ActiveFilter::Inactive)
        } else {
            None
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            ActiveFilter::Any => None,
            ActiveFilter::Active => Some(true),
            ActiveFilter::Inactive => Some(false),
        }
    }
}

impl From<Option<bool>> for ActiveFilter {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => ActiveFilter::Any,
            Some(true) => ActiveFilter::Active,
            Some(false) => ActiveFilter::Inactive,
        }
    }
}

impl From<bool> for ActiveFilter {
    fn from(value: bool) -> Self {
        Some(value).into()
    }
}

/// Typed search criteria. Every field is optional; absent fields do not
/// constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct InvoiceCriteria {
    pub invoice_number: Option<String>,
    pub status: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub active: ActiveFilter,
}

impl InvoiceCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_invoice_number(mut self, number: impl AsRef<str>) -> Self {
        self.invoice_number = non_blank(number.as_ref());
        self
    }

    pub fn with_status(mut self, status: impl AsRef<str>) -> Self {
        self.status = non_blank(status.as_ref());
        self
    }

    pub fn with_date_from(mut self, date: NaiveDate) -> Self {
        self.date_from = Some(date);
        self
    }

    pub fn with_date_to(mut self, date: NaiveDate) -> Self {
        self.date_to = Some(date);
        self
    }

    pub fn with_min_amount(mut self, amount: Decimal) -> Self {
        self.min_amount = Some(amount);
        self
    }

    pub fn with_max_amount(mut self, amount: Decimal) -> Self {
        self.max_amount = Some(amount);
        self
    }

    pub fn with_active(mut self, active: impl Into<ActiveFilter>) -> Self {
        self.active = active.into();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.invoice_number.is_none()
            && self.status.is_none()
            && self.date_from.is_none()
            && self.date_to.is_none()
            && self.min_amount.is_none()
            && self.max_amount.is_none()
            && self.active == ActiveFilter::Any
    }

    /// Only `status` is set; these get the longer "broad query" TTL.
    pub fn is_status_only(&self) -> bool {
        self.status.is_some()
            && Self {
                status: None,
                ..self.clone()
            }
            .is_empty()
    }
}

impl From<&SearchParams> for InvoiceCriteria {
    fn from(params: &SearchParams) -> Self {
        InvoiceCriteria {
            invoice_number: params.invoice_number().map(str::to_string),
            status: params.status().map(str::to_string),
            date_from: params.date_from().and_then(parse_date),
            date_to: params.date_to().and_then(parse_date),
            min_amount: params.min_amount().and_then(parse_amount),
            max_amount: params.max_amount().and_then(parse_amount),
            active: params
                .active()
                .and_then(ActiveFilter::parse)
                .unwrap_or_default(),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// ISO dates (`2024-01-31`), `31/01/2024`, or an RFC 3339 timestamp whose
/// date part is used.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

pub fn parse_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_params_are_absent() {
        let params = SearchParams::from_pairs([("invoice_number", "   "), ("status", "")]);
        assert_eq!(params.invoice_number(), None);
        assert_eq!(params.status(), None);
        assert!(params.has_no_filters());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let params = SearchParams::from_pairs([("controller", "invoices"), ("status", "Pagada")]);
        assert_eq!(params.status(), Some("Pagada"));
        assert!(!params.has_no_filters());
    }

    #[test]
    fn test_paging_fields_do_not_count_as_filters() {
        let params = SearchParams::from_pairs([("page", "2"), ("per_page", "abc")]);
        assert!(params.has_no_filters());
        assert_eq!(params.page(), Some(2));
        assert_eq!(params.per_page(), None);
    }

    #[test]
    fn test_criteria_from_params_parses_every_field() {
        let params = SearchParams::from_pairs([
            ("invoice_number", " C300 "),
            ("status", "Vigente"),
            ("date_from", "2024-01-01"),
            ("date_to", "31/01/2024"),
            ("min_amount", "10.5"),
            ("max_amount", "20"),
            ("active", "TRUE"),
        ]);
        let criteria = InvoiceCriteria::from(&params);

        assert_eq!(criteria.invoice_number.as_deref(), Some("C300"));
        assert_eq!(criteria.status.as_deref(), Some("Vigente"));
        assert_eq!(criteria.date_from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(criteria.date_to, NaiveDate::from_ymd_opt(2024, 1, 31));
        assert_eq!(criteria.min_amount, Some(Decimal::new(105, 1)));
        assert_eq!(criteria.max_amount, Some(Decimal::new(20, 0)));
        assert_eq!(criteria.active, ActiveFilter::Active);
    }

    #[test]
    fn test_unparsable_values_leave_fields_unset() {
        let params = SearchParams::from_pairs([
            ("date_from", "yesterday"),
            ("min_amount", "ten"),
            ("active", "maybe"),
        ]);
        let criteria = InvoiceCriteria::from(&params);
        assert!(criteria.is_empty());
    }

    #[test]
    fn test_status_only_detection() {
        assert!(InvoiceCriteria::new().with_status("Pagada").is_status_only());
        assert!(!InvoiceCriteria::new().is_status_only());
        assert!(!InvoiceCriteria::new()
            .with_status("Pagada")
            .with_active(true)
            .is_status_only());
    }

    #[test]
    fn test_parse_date_accepts_rfc3339() {
        assert_eq!(
            parse_date("2024-03-05T23:10:00-05:00"),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
        assert_eq!(parse_date("2024-13-01"), None);
    }
}
