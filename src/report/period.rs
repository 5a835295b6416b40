//! Turns a report period such as "current-month" into a date range.

use time::{Date, PrimitiveDateTime, UtcOffset};

use crate::{
    Error,
    date_time::{
        DateBound, END_OF_DAY, first_day_of_month, first_day_of_previous_month,
        last_day_of_month, parse_date_time,
    },
    expense::ExpenseFilter,
};

/// The period used when a request does not name one.
pub const DEFAULT_PERIOD: &str = "current-month";

/// The named periods a report can cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// From the first to the last day of the current month.
    CurrentMonth,
    /// From the start of the month two months ago until now.
    LastThreeMonths,
    /// Between explicit start and end dates.
    Custom,
    /// No date restriction.
    AllTime,
}

impl Period {
    /// Parse a period name, returning `None` for names that are not recognised.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "current-month" => Some(Self::CurrentMonth),
            "last-3-months" => Some(Self::LastThreeMonths),
            "custom" => Some(Self::Custom),
            "all-time" => Some(Self::AllTime),
            _ => None,
        }
    }
}

/// Which expenses a report should include by date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    /// Expenses between `start` and `end` inclusive.
    ///
    /// `start` may be after `end`, in which case nothing matches.
    Range {
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
    },
    /// Every expense regardless of date.
    Unbounded,
}

impl DateFilter {
    /// The equivalent filter for expense queries.
    pub fn to_expense_filter(self) -> ExpenseFilter {
        match self {
            DateFilter::Range { start, end } => ExpenseFilter::in_range(start, end),
            DateFilter::Unbounded => ExpenseFilter::default(),
        }
    }
}

/// Resolve a requested period into a date filter, relative to `now`.
///
/// A missing `period` means the current month. Unknown periods, "all-time"
/// and a custom period missing either bound match every expense.
/// Date-only custom bounds cover whole days.
///
/// # Errors
///
/// Returns an [Error::InvalidDate] if a custom bound cannot be parsed.
pub fn resolve_date_range(
    period: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
    now: PrimitiveDateTime,
    local_offset: UtcOffset,
) -> Result<DateFilter, Error> {
    let period = Period::from_name(period.unwrap_or(DEFAULT_PERIOD));

    let date_filter = match period {
        Some(Period::CurrentMonth) => DateFilter::Range {
            start: first_day_of_month(now.date()).midnight(),
            end: PrimitiveDateTime::new(last_day_of_month(now.date()), END_OF_DAY),
        },
        Some(Period::LastThreeMonths) => DateFilter::Range {
            start: months_before(now.date(), 2).midnight(),
            end: now,
        },
        Some(Period::Custom) => match (start, end) {
            (Some(start), Some(end)) => DateFilter::Range {
                start: parse_date_time(start, DateBound::Start, local_offset)?,
                end: parse_date_time(end, DateBound::End, local_offset)?,
            },
            _ => DateFilter::Unbounded,
        },
        Some(Period::AllTime) | None => DateFilter::Unbounded,
    };

    Ok(date_filter)
}

/// The first day of the month `count` months before the month of `date`.
pub fn months_before(date: Date, count: u8) -> Date {
    let mut first_day = first_day_of_month(date);

    for _ in 0..count {
        first_day = first_day_of_previous_month(first_day);
    }

    first_day
}
