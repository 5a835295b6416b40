//! The daily spending series for the expense trends chart.

use std::collections::BTreeMap;

use serde::Serialize;
use time::Date;

use crate::{date_time::format_date, expense::Expense};

/// The total spent on one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    /// The day as "YYYY-MM-DD".
    pub date: String,
    pub amount: f64,
}

/// Total `expenses` for each day from `start` to `end` inclusive.
///
/// Every day in the range gets a point, zero if nothing was spent. Expenses
/// dated outside the range are ignored and an empty series is returned if
/// `start` is after `end`.
pub fn daily_totals(expenses: &[Expense], start: Date, end: Date) -> Vec<DailyPoint> {
    let mut totals: BTreeMap<Date, f64> = BTreeMap::new();

    let mut day = start;
    while day <= end {
        totals.insert(day, 0.0);

        match day.next_day() {
            Some(next_day) => day = next_day,
            None => break,
        }
    }

    for expense in expenses {
        if let Some(amount) = totals.get_mut(&expense.date.date()) {
            *amount += expense.amount;
        }
    }

    totals
        .into_iter()
        .map(|(date, amount)| DailyPoint {
            date: format_date(date),
            amount,
        })
        .collect()
}
