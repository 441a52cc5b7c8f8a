use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::invoice::round_cents;

/// One `GROUP BY invoice_date` row straight from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DailySales {
    pub day: NaiveDate,
    pub invoices_count: i64,
    pub total_amount: Decimal,
}

/// Reporting view of a single day, recomputed on every aggregation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub day: NaiveDate,
    pub invoices_count: i64,
    pub total_amount: Decimal,
    pub average_invoice_value: Decimal,
}

impl DailyAggregate {
    pub fn from_sales(sales: DailySales) -> Self {
        let average_invoice_value = if sales.invoices_count > 0 {
            round_cents(sales.total_amount / Decimal::from(sales.invoices_count))
        } else {
            Decimal::ZERO
        };

        DailyAggregate {
            day: sales.day,
            invoices_count: sales.invoices_count,
            total_amount: sales.total_amount,
            average_invoice_value,
        }
    }

    /// `1500.00 (25 invoices)`
    pub fn total_sales_label(&self) -> String {
        format!("{:.2} ({} invoices)", round_cents(self.total_amount), self.invoices_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_is_rounded_to_cents() {
        let aggregate = DailyAggregate::from_sales(DailySales {
            day: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            invoices_count: 3,
            total_amount: Decimal::new(1000, 2),
        });
        assert_eq!(aggregate.average_invoice_value, Decimal::new(333, 2));
    }

    #[test]
    fn test_total_sales_label() {
        let aggregate = DailyAggregate::from_sales(DailySales {
            day: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            invoices_count: 25,
            total_amount: Decimal::new(1500, 0),
        });
        assert_eq!(aggregate.total_sales_label(), "1500.00 (25 invoices)");
        assert_eq!(aggregate.average_invoice_value, Decimal::new(60, 0));
    }
}
