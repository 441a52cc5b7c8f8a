//! Criteria → query descriptor.
//!
//! `InvoiceQuery::from_criteria` is a pure function: one predicate per present
//! field, combined with AND. The same descriptor drives the in-memory matcher
//! and the SQL rendering, so both stores agree on what matches.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Postgres, QueryBuilder};
use std::cmp::Ordering;

use crate::models::{Invoice, InvoiceCriteria};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Case-insensitive substring; the needle is stored lowercased.
    NumberContains(String),
    StatusEquals(String),
    DateFrom(NaiveDate),
    DateTo(NaiveDate),
    MinAmount(Decimal),
    MaxAmount(Decimal),
    /// Strictly greater than.
    AmountAbove(Decimal),
    Active(bool),
}

impl Predicate {
    pub fn matches(&self, invoice: &Invoice) -> bool {
        match self {
            Predicate::NumberContains(needle) => {
                invoice.invoice_number.to_lowercase().contains(needle.as_str())
            }
            Predicate::StatusEquals(status) => invoice.status == *status,
            Predicate::DateFrom(from) => invoice.invoice_date >= *from,
            Predicate::DateTo(to) => invoice.invoice_date <= *to,
            Predicate::MinAmount(min) => invoice.total >= *min,
            Predicate::MaxAmount(max) => invoice.total <= *max,
            Predicate::AmountAbove(floor) => invoice.total > *floor,
            Predicate::Active(active) => invoice.active == *active,
        }
    }

    fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            Predicate::NumberContains(needle) => {
                qb.push("invoice_number ILIKE ")
                    .push_bind(format!("%{}%", escape_like(needle)));
            }
            Predicate::StatusEquals(status) => {
                qb.push("status = ").push_bind(status.clone());
            }
            Predicate::DateFrom(from) => {
                qb.push("invoice_date >= ").push_bind(*from);
            }
            Predicate::DateTo(to) => {
                qb.push("invoice_date <= ").push_bind(*to);
            }
            Predicate::MinAmount(min) => {
                qb.push("total >= ").push_bind(*min);
            }
            Predicate::MaxAmount(max) => {
                qb.push("total <= ").push_bind(*max);
            }
            Predicate::AmountAbove(floor) => {
                qb.push("total > ").push_bind(*floor);
            }
            Predicate::Active(active) => {
                qb.push("active = ").push_bind(*active);
            }
        }
    }
}

/// Conjunction of predicates. An empty query matches every invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceQuery {
    predicates: Vec<Predicate>,
}

impl InvoiceQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn from_criteria(criteria: &InvoiceCriteria) -> Self {
        let mut predicates = Vec::new();

        if let Some(number) = criteria.invoice_number.as_deref().map(str::trim) {
            if !number.is_empty() {
                predicates.push(Predicate::NumberContains(number.to_lowercase()));
            }
        }
        if let Some(status) = criteria.status.as_deref().map(str::trim) {
            if !status.is_empty() {
                predicates.push(Predicate::StatusEquals(status.to_string()));
            }
        }
        if let Some(from) = criteria.date_from {
            predicates.push(Predicate::DateFrom(from));
        }
        if let Some(to) = criteria.date_to {
            predicates.push(Predicate::DateTo(to));
        }
        if let Some(min) = criteria.min_amount {
            predicates.push(Predicate::MinAmount(min));
        }
        if let Some(max) = criteria.max_amount {
            predicates.push(Predicate::MaxAmount(max));
        }
        if let Some(active) = criteria.active.as_bool() {
            predicates.push(Predicate::Active(active));
        }

        Self { predicates }
    }

    pub fn from_predicates(predicates: Vec<Predicate>) -> Self {
        Self { predicates }
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_unfiltered(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches(&self, invoice: &Invoice) -> bool {
        self.predicates.iter().all(|p| p.matches(invoice))
    }

    /// Appends ` WHERE TRUE AND ...`, leaving the builder ready for further
    /// ` AND` clauses.
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE TRUE");
        for predicate in &self.predicates {
            qb.push(" AND ");
            predicate.push_sql(qb);
        }
    }
}

// ============================================================================
// ORDERING / KEYSET CURSOR
// ============================================================================

pub const ORDER_BY_RECENT: &str = " ORDER BY invoice_date DESC, id DESC";

/// Result ordering: newest date first, then highest id.
pub fn recent_first(a: &Invoice, b: &Invoice) -> Ordering {
    b.invoice_date
        .cmp(&a.invoice_date)
        .then_with(|| b.id.cmp(&a.id))
}

/// Position after the last row handed out, for keyset batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub invoice_date: NaiveDate,
    pub id: i64,
}

impl Cursor {
    pub fn after(invoice: &Invoice) -> Self {
        Self {
            invoice_date: invoice.invoice_date,
            id: invoice.id,
        }
    }

    /// True when `invoice` sorts strictly after this cursor.
    pub fn precedes(&self, invoice: &Invoice) -> bool {
        (invoice.invoice_date, invoice.id) < (self.invoice_date, self.id)
    }

    pub fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" AND (invoice_date, id) < (")
            .push_bind(self.invoice_date)
            .push(", ")
            .push_bind(self.id)
            .push(")");
    }
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActiveFilter;

    fn invoice(id: i64, number: &str, day: u32, total: i64, status: &str, active: bool) -> Invoice {
        Invoice {
            id,
            invoice_number: number.to_string(),
            total: Decimal::new(total, 0),
            invoice_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            status: status.to_string(),
            active,
        }
    }

    #[test]
    fn test_empty_criteria_matches_everything() {
        let query = InvoiceQuery::from_criteria(&InvoiceCriteria::new());
        assert!(query.is_unfiltered());
        assert!(query.matches(&invoice(1, "C1", 1, 10, "Pagada", false)));
    }

    #[test]
    fn test_one_predicate_per_present_field() {
        let criteria = InvoiceCriteria::new()
            .with_invoice_number("C3")
            .with_status("Vigente")
            .with_date_from(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .with_date_to(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap())
            .with_min_amount(Decimal::new(10, 0))
            .with_max_amount(Decimal::new(20, 0))
            .with_active(ActiveFilter::Inactive);
        assert_eq!(InvoiceQuery::from_criteria(&criteria).predicates().len(), 7);
    }

    #[test]
    fn test_number_match_is_case_insensitive_substring() {
        let query = InvoiceQuery::from_criteria(&InvoiceCriteria::new().with_invoice_number("c300"));
        assert!(query.matches(&invoice(1, "C30012", 1, 10, "Vigente", true)));
        assert!(!query.matches(&invoice(2, "C40012", 1, 10, "Vigente", true)));
    }

    #[test]
    fn test_predicates_are_conjunctive_and_bounds_inclusive() {
        let criteria = InvoiceCriteria::new()
            .with_status("Vigente")
            .with_min_amount(Decimal::new(10, 0))
            .with_max_amount(Decimal::new(20, 0))
            .with_active(true);
        let query = InvoiceQuery::from_criteria(&criteria);

        assert!(query.matches(&invoice(1, "C1", 1, 10, "Vigente", true)));
        assert!(query.matches(&invoice(2, "C2", 1, 20, "Vigente", true)));
        assert!(!query.matches(&invoice(3, "C3", 1, 21, "Vigente", true)));
        assert!(!query.matches(&invoice(4, "C4", 1, 15, "Pagada", true)));
        assert!(!query.matches(&invoice(5, "C5", 1, 15, "Vigente", false)));
    }

    #[test]
    fn test_recent_first_breaks_ties_by_id() {
        let mut rows = vec![
            invoice(1, "A", 1, 1, "Vigente", true),
            invoice(3, "B", 2, 1, "Vigente", true),
            invoice(2, "C", 2, 1, "Vigente", true),
        ];
        rows.sort_by(recent_first);
        let ids: Vec<i64> = rows.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_cursor_precedes_follows_result_order() {
        let cursor = Cursor::after(&invoice(5, "A", 10, 1, "Vigente", true));
        assert!(cursor.precedes(&invoice(4, "B", 10, 1, "Vigente", true)));
        assert!(cursor.precedes(&invoice(9, "C", 9, 1, "Vigente", true)));
        assert!(!cursor.precedes(&invoice(6, "D", 10, 1, "Vigente", true)));
        assert!(!cursor.precedes(&invoice(1, "E", 11, 1, "Vigente", true)));
    }

    #[test]
    fn test_sql_rendering_binds_every_predicate() {
        let criteria = InvoiceCriteria::new()
            .with_invoice_number("50%")
            .with_status("Pagada")
            .with_active(false);
        let mut qb = QueryBuilder::<Postgres>::new("SELECT id FROM invoices");
        InvoiceQuery::from_criteria(&criteria).push_where(&mut qb);
        assert_eq!(
            qb.sql(),
            "SELECT id FROM invoices WHERE TRUE AND invoice_number ILIKE $1 AND status = $2 AND active = $3"
        );
    }

    #[test]
    fn test_amount_above_is_strict() {
        let query = InvoiceQuery::from_predicates(vec![Predicate::AmountAbove(Decimal::new(20, 0))]);
        assert!(!query.matches(&invoice(1, "C1", 1, 20, "Vigente", true)));
        assert!(query.matches(&invoice(2, "C2", 1, 21, "Vigente", true)));

        let mut qb = QueryBuilder::<Postgres>::new("SELECT id FROM invoices");
        query.push_where(&mut qb);
        assert_eq!(qb.sql(), "SELECT id FROM invoices WHERE TRUE AND total > $1");
    }

    #[test]
    fn test_escape_like_metacharacters() {
        assert_eq!(escape_like("50%_a\\b"), "50\\%\\_a\\\\b");
    }
}
