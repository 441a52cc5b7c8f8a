use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::criteria::{parse_amount, parse_date, ActiveFilter, InvoiceCriteria, SearchParams};

pub const INVALID_DATE_FORMAT: &str = "Invalid date format";
pub const START_AFTER_END: &str = "Start date cannot be after end date";
pub const MIN_GREATER_THAN_MAX: &str = "Minimum amount cannot be greater than maximum amount";
pub const INVALID_AMOUNT_FORMAT: &str = "Invalid amount format";
pub const INVALID_ACTIVE_VALUE: &str = "Invalid active value";

// ============================================================================
// SEARCH PARAMETER VALIDATION
// ============================================================================

/// Cross-field checks run before any query reaches the store.
/// An empty list means the parameters are valid.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvoiceSearchValidator;

impl InvoiceSearchValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, params: &SearchParams) -> Vec<String> {
        let mut errors = Vec::new();

        validate_date_range(params, &mut errors);
        validate_amount_range(params, &mut errors);

        if let Some(raw) = params.active() {
            if ActiveFilter::parse(raw).is_none() {
                errors.push(INVALID_ACTIVE_VALUE.to_string());
            }
        }

        errors
    }

    /// Range checks for criteria built in code rather than parsed from a request.
    pub fn validate_criteria(&self, criteria: &InvoiceCriteria) -> Vec<String> {
        let mut errors = Vec::new();
        check_date_order(criteria.date_from, criteria.date_to, &mut errors);
        check_amount_order(criteria.min_amount, criteria.max_amount, &mut errors);
        errors
    }
}

fn validate_date_range(params: &SearchParams, errors: &mut Vec<String>) {
    let from = params.date_from().map(parse_date);
    let to = params.date_to().map(parse_date);

    // Some(None) = present but unparsable
    if matches!(from, Some(None)) || matches!(to, Some(None)) {
        errors.push(INVALID_DATE_FORMAT.to_string());
        return;
    }

    check_date_order(from.flatten(), to.flatten(), errors);
}

fn validate_amount_range(params: &SearchParams, errors: &mut Vec<String>) {
    let min = params.min_amount().map(parse_amount);
    let max = params.max_amount().map(parse_amount);

    if matches!(min, Some(None)) || matches!(max, Some(None)) {
        errors.push(INVALID_AMOUNT_FORMAT.to_string());
        return;
    }

    check_amount_order(min.flatten(), max.flatten(), errors);
}

fn check_date_order(from: Option<NaiveDate>, to: Option<NaiveDate>, errors: &mut Vec<String>) {
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            errors.push(START_AFTER_END.to_string());
        }
    }
}

fn check_amount_order(min: Option<Decimal>, max: Option<Decimal>, errors: &mut Vec<String>) {
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            errors.push(MIN_GREATER_THAN_MAX.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(pairs: &[(&str, &str)]) -> Vec<String> {
        InvoiceSearchValidator::new().validate(&SearchParams::from_pairs(pairs.iter().copied()))
    }

    #[test]
    fn test_empty_params_are_valid() {
        assert!(validate(&[]).is_empty());
    }

    #[test]
    fn test_start_after_end_is_reported_once() {
        let errors = validate(&[("date_from", "2024-02-01"), ("date_to", "2024-01-01")]);
        assert_eq!(errors, vec![START_AFTER_END.to_string()]);
    }

    #[test]
    fn test_same_day_range_is_valid() {
        assert!(validate(&[("date_from", "2024-01-01"), ("date_to", "2024-01-01")]).is_empty());
    }

    #[test]
    fn test_single_unparsable_date_is_reported() {
        assert_eq!(validate(&[("date_from", "not-a-date")]), vec![INVALID_DATE_FORMAT.to_string()]);
        assert_eq!(
            validate(&[("date_from", "2024-01-01"), ("date_to", "2024-02-30")]),
            vec![INVALID_DATE_FORMAT.to_string()]
        );
    }

    #[test]
    fn test_amount_order() {
        assert_eq!(
            validate(&[("min_amount", "50"), ("max_amount", "10.5")]),
            vec![MIN_GREATER_THAN_MAX.to_string()]
        );
        assert!(validate(&[("min_amount", "10"), ("max_amount", "10.00")]).is_empty());
    }

    #[test]
    fn test_unparsable_amount_and_active() {
        assert_eq!(validate(&[("max_amount", "lots")]), vec![INVALID_AMOUNT_FORMAT.to_string()]);
        assert_eq!(validate(&[("active", "yes")]), vec![INVALID_ACTIVE_VALUE.to_string()]);
        assert!(validate(&[("active", "false")]).is_empty());
    }

    #[test]
    fn test_errors_accumulate_across_fields() {
        let errors = validate(&[
            ("date_from", "2024-02-01"),
            ("date_to", "2024-01-01"),
            ("min_amount", "30"),
            ("max_amount", "20"),
        ]);
        assert_eq!(errors, vec![START_AFTER_END.to_string(), MIN_GREATER_THAN_MAX.to_string()]);
    }

    #[test]
    fn test_validate_criteria_checks_ranges() {
        let criteria = InvoiceCriteria::new()
            .with_min_amount(Decimal::new(30, 0))
            .with_max_amount(Decimal::new(20, 0));
        assert_eq!(
            InvoiceSearchValidator::new().validate_criteria(&criteria),
            vec![MIN_GREATER_THAN_MAX.to_string()]
        );
    }
}
