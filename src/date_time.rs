//! Parsing and formatting of the date-times used by expenses and report queries.
//!
//! Expense dates are timezone-naive local date-times. They are stored as text
//! in the form "2024-01-31T13:45:00" so that SQLite can compare them
//! lexicographically in range queries.

use rusqlite::{Row, types::Type};
use time::{
    Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::{format_description, time},
};

use crate::Error;

const DATE_TIME_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

const DATE_TIME_MINUTES_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]");

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// The last second of a day.
pub const END_OF_DAY: Time = time!(23:59:59);

/// Which end of a range a date string describes.
///
/// This decides the time of day given to date-only strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    /// A date-only string means the start of the day, 00:00:00.
    Start,
    /// A date-only string means the end of the day, 23:59:59.
    End,
}

/// Parse a date or date-time string into a local date-time.
///
/// Accepts "YYYY-MM-DD", "YYYY-MM-DDTHH:MM", "YYYY-MM-DDTHH:MM:SS" and RFC 3339
/// timestamps. Timestamps with an offset are converted to `local_offset`.
///
/// # Errors
///
/// Returns an [Error::InvalidDate] if `raw` is not in any of the accepted formats.
pub fn parse_date_time(
    raw: &str,
    bound: DateBound,
    local_offset: UtcOffset,
) -> Result<PrimitiveDateTime, Error> {
    let raw = raw.trim();

    if let Ok(timestamp) = OffsetDateTime::parse(raw, &Rfc3339) {
        let local = timestamp.to_offset(local_offset);
        return Ok(PrimitiveDateTime::new(local.date(), local.time()));
    }

    if let Ok(date_time) = PrimitiveDateTime::parse(raw, DATE_TIME_FORMAT) {
        return Ok(date_time);
    }

    if let Ok(date_time) = PrimitiveDateTime::parse(raw, DATE_TIME_MINUTES_FORMAT) {
        return Ok(date_time);
    }

    match Date::parse(raw, DATE_FORMAT) {
        Ok(date) => match bound {
            DateBound::Start => Ok(date.midnight()),
            DateBound::End => Ok(PrimitiveDateTime::new(date, END_OF_DAY)),
        },
        Err(_) => Err(Error::InvalidDate(raw.to_owned())),
    }
}

/// Format a date-time the way it is stored in the database and sent to clients.
///
/// Sub-second precision is dropped.
pub fn format_date_time(date_time: PrimitiveDateTime) -> String {
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        date_time.year(),
        u8::from(date_time.month()),
        date_time.day(),
        date_time.hour(),
        date_time.minute(),
        date_time.second()
    )
}

/// Format a date as "YYYY-MM-DD".
pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Read a date-time stored by [format_date_time] from column `index` of `row`.
pub fn date_time_from_row(row: &Row, index: usize) -> Result<PrimitiveDateTime, rusqlite::Error> {
    let raw: String = row.get(index)?;

    PrimitiveDateTime::parse(&raw, DATE_TIME_FORMAT)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error)))
}

/// Read an RFC 3339 timestamp from column `index` of `row`.
pub fn timestamp_from_row(row: &Row, index: usize) -> Result<OffsetDateTime, rusqlite::Error> {
    let raw: String = row.get(index)?;

    OffsetDateTime::parse(&raw, &Rfc3339)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error)))
}

/// The SQL expression that produces the current UTC time as an RFC 3339 timestamp.
pub const SQL_NOW: &str = "strftime('%Y-%m-%dT%H:%M:%SZ', 'now')";

/// The first day of the month that `date` falls in.
pub fn first_day_of_month(date: Date) -> Date {
    date - Duration::days(i64::from(date.day()) - 1)
}

/// The last day of the month that `date` falls in.
pub fn last_day_of_month(date: Date) -> Date {
    let first_day = first_day_of_month(date);

    first_day + Duration::days(i64::from(days_in_month(date.year(), date.month())) - 1)
}

/// The first day of the month before the month that `date` falls in.
pub fn first_day_of_previous_month(date: Date) -> Date {
    let last_day_of_previous_month = first_day_of_month(date) - Duration::days(1);

    first_day_of_month(last_day_of_previous_month)
}

fn days_in_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

pub(crate) mod date_time_format {
    //! Serialize a [time::PrimitiveDateTime] as "YYYY-MM-DDTHH:MM:SS".
    //!
    //! The default serde format for [time::PrimitiveDateTime] includes
    //! nanoseconds, which clients do not expect.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::PrimitiveDateTime;

    use super::{DATE_TIME_FORMAT, format_date_time};

    pub fn serialize<S>(date_time: &PrimitiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_date_time(*date_time))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<PrimitiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PrimitiveDateTime::parse(&s, DATE_TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}
