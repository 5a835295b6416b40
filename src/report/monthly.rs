//! The monthly spending series for the monthly comparison chart.

use std::{collections::BTreeMap, num::IntErrorKind};

use serde::Serialize;
use time::{Date, Month};

use crate::{
    Error,
    date_time::{first_day_of_month, first_day_of_previous_month},
    expense::Expense,
    report::period::months_before,
};

/// The number of months shown when a request does not say.
pub const DEFAULT_MONTH_COUNT: u8 = 6;

/// The largest number of months in a series.
pub const MAX_MONTH_COUNT: u8 = 12;

/// The total spent in one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPoint {
    /// The month as "YYYY-MM".
    pub month: String,
    /// The month as "MMM YYYY", e.g. "Jan 2024".
    pub month_name: String,
    pub amount: f64,
}

/// Parse the number of months requested, clamped to between 1 and 12.
///
/// # Errors
///
/// Returns an [Error::InvalidQueryParameter] if `raw` is not an integer.
pub fn parse_month_count(raw: Option<&str>) -> Result<u8, Error> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_MONTH_COUNT);
    };

    let count: i64 = match raw.trim().parse() {
        Ok(count) => count,
        Err(error) => match error.kind() {
            IntErrorKind::PosOverflow => i64::MAX,
            IntErrorKind::NegOverflow => i64::MIN,
            _ => return Err(Error::InvalidQueryParameter("months", raw.to_owned())),
        },
    };

    let clamped = count.clamp(1, i64::from(MAX_MONTH_COUNT));

    // Always fits after clamping.
    Ok(u8::try_from(clamped).unwrap_or(MAX_MONTH_COUNT))
}

/// The first day of the oldest month in a series of `month_count` months
/// ending with the month of `today`.
pub fn first_day_of_series(month_count: u8, today: Date) -> Date {
    months_before(today, month_count.saturating_sub(1))
}

/// Total `expenses` for each of the `month_count` months ending with the
/// month of `today`, oldest first.
///
/// Every month gets a point, zero if nothing was spent. Expenses dated
/// outside those months are ignored.
pub fn monthly_totals(expenses: &[Expense], month_count: u8, today: Date) -> Vec<MonthlyPoint> {
    // Keyed by the first day of each month.
    let mut totals: BTreeMap<Date, f64> = BTreeMap::new();

    let mut month_start = first_day_of_month(today);
    for _ in 0..month_count {
        totals.insert(month_start, 0.0);
        month_start = first_day_of_previous_month(month_start);
    }

    for expense in expenses {
        if let Some(amount) = totals.get_mut(&first_day_of_month(expense.date.date())) {
            *amount += expense.amount;
        }
    }

    totals
        .into_iter()
        .map(|(month_start, amount)| {
            let year = month_start.year();
            let month = month_start.month();

            MonthlyPoint {
                month: format!("{year:04}-{:02}", u8::from(month)),
                month_name: format!("{} {year}", short_month_name(month)),
                amount,
            }
        })
        .collect()
}

fn short_month_name(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}
