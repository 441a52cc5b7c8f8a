pub mod top_selling_days;

pub use top_selling_days::{execute_report, start_top_selling_days_scheduler};
