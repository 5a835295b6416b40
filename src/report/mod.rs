//! Spending reports for charts.
//!
//! The aggregation functions in this module are pure: they take the expenses
//! and categories fetched by the endpoints and derive the chart series.
//! Daily and monthly series are dense, with a zero for every empty day or
//! month in range.

mod category_totals;
mod daily;
mod handlers;
mod monthly;
mod period;

pub use handlers::{get_expenses_by_category, get_expenses_by_month, get_expenses_by_time};
