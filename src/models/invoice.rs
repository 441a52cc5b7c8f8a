use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Estado "vigente" tal como se guarda en la tabla `invoices`.
pub const STATUS_VIGENTE: &str = "Vigente";
pub const STATUS_PAGADA: &str = "Pagada";
pub const STATUS_VENCIDA: &str = "Vencida";

/// Invoice row as stored in `public.invoices`. Read-only from this crate.
///
/// `status` is kept as the raw string so unknown states survive a round trip
/// through the cache and the CSV export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub id: i64,
    pub invoice_number: String,
    pub total: Decimal,
    pub invoice_date: NaiveDate,
    pub status: String,
    pub active: bool,
}

impl Invoice {
    /// Total rounded to cents, e.g. `$10.50`.
    pub fn formatted_total(&self) -> String {
        format!("${:.2}", round_cents(self.total))
    }

    pub fn is_vigente(&self) -> bool {
        self.status == STATUS_VIGENTE
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Half-up rounding to two decimals, shared by the CSV export and the report.
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
