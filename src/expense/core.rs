//! Defines the core data model and database queries for expenses.

use rusqlite::{Connection, Row, ToSql, params_from_iter};
use serde::Serialize;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};
use uuid::Uuid;

use crate::{
    Error, UserID,
    date_time::{
        DateBound, SQL_NOW, date_time_format, date_time_from_row, format_date_time,
        parse_date_time, timestamp_from_row,
    },
};

// ============================================================================
// MODELS
// ============================================================================

/// Database identifier for an expense, a lower-case hex string.
pub type ExpenseId = String;

/// Money spent by a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: ExpenseId,
    pub title: String,
    /// Always greater than zero.
    pub amount: f64,
    /// When the money was spent, in the user's local time.
    #[serde(with = "date_time_format")]
    pub date: PrimitiveDateTime,
    /// The ID of the category the expense belongs to.
    ///
    /// This is not checked against the category table, so it may refer to
    /// a category that has since been deleted.
    pub category: String,
    pub description: Option<String>,
    pub user_id: UserID,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The user editable fields of an expense, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseFields {
    pub title: String,
    pub amount: f64,
    pub date: PrimitiveDateTime,
    pub category: String,
    pub description: Option<String>,
}

/// Narrows down which of a user's expenses a query returns.
///
/// Both date bounds are inclusive. An empty filter matches every expense.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFilter {
    /// Only match expenses whose category is exactly this ID.
    pub category: Option<String>,
    /// Only match expenses on or after this date-time.
    pub start: Option<PrimitiveDateTime>,
    /// Only match expenses on or before this date-time.
    pub end: Option<PrimitiveDateTime>,
}

impl ExpenseFilter {
    /// A filter matching expenses between `start` and `end` inclusive.
    pub fn in_range(start: PrimitiveDateTime, end: PrimitiveDateTime) -> Self {
        Self {
            category: None,
            start: Some(start),
            end: Some(end),
        }
    }

    /// Build the WHERE clause for `user_id` and its parameters.
    fn where_clause(&self, user_id: UserID) -> (String, Vec<Box<dyn ToSql>>) {
        let mut conditions = vec!["user_id = ?"];
        let mut params: Vec<Box<dyn ToSql>> = vec![Box::new(user_id.as_i64())];

        if let Some(category) = &self.category {
            conditions.push("category = ?");
            params.push(Box::new(category.clone()));
        }

        if let Some(start) = self.start {
            conditions.push("date >= ?");
            params.push(Box::new(format_date_time(start)));
        }

        if let Some(end) = self.end {
            conditions.push("date <= ?");
            params.push(Box::new(format_date_time(end)));
        }

        (format!("WHERE {}", conditions.join(" AND ")), params)
    }
}

/// Which slice of the sorted results to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    /// The maximum number of rows.
    pub limit: u64,
    /// The number of rows to skip.
    pub offset: u64,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const EXPENSE_COLUMNS: &str =
    "id, title, amount, date, category, description, user_id, created_at, updated_at";

/// Create an expense owned by `user_id` and return it with its generated ID.
///
/// # Errors
/// Returns an [Error::SqlError] if the amount is not positive or there is
/// some other SQL error.
pub fn create_expense(
    fields: ExpenseFields,
    user_id: UserID,
    connection: &Connection,
) -> Result<Expense, Error> {
    let id = Uuid::new_v4().simple().to_string();

    connection
        .prepare(&format!(
            "INSERT INTO expense (id, title, amount, date, category, description, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING {EXPENSE_COLUMNS}"
        ))?
        .query_row(
            (
                id,
                fields.title,
                fields.amount,
                format_date_time(fields.date),
                fields.category,
                fields.description,
                user_id.as_i64(),
            ),
            map_expense_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve one of the user's expenses by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::ExpenseNotFound] if the user has no expense with `id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_expense(id: &str, user_id: UserID, connection: &Connection) -> Result<Expense, Error> {
    connection
        .prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expense WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_one((id, user_id.as_i64()), map_expense_row)
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::ExpenseNotFound,
            error => error,
        })
}

/// Replace the user editable fields of one of the user's expenses.
///
/// # Errors
/// This function will return a:
/// - [Error::ExpenseNotFound] if the user has no expense with `id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_expense(
    id: &str,
    fields: ExpenseFields,
    user_id: UserID,
    connection: &Connection,
) -> Result<Expense, Error> {
    connection
        .prepare(&format!(
            "UPDATE expense
             SET title = ?1, amount = ?2, date = ?3, category = ?4, description = ?5,
                 updated_at = {SQL_NOW}
             WHERE id = ?6 AND user_id = ?7
             RETURNING {EXPENSE_COLUMNS}"
        ))?
        .query_one(
            (
                fields.title,
                fields.amount,
                format_date_time(fields.date),
                fields.category,
                fields.description,
                id,
                user_id.as_i64(),
            ),
            map_expense_row,
        )
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::ExpenseNotFound,
            error => error,
        })
}

/// Delete one of the user's expenses.
///
/// # Errors
/// Returns an [Error::ExpenseNotFound] if the user has no expense with `id`.
pub fn delete_expense(id: &str, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM expense WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::ExpenseNotFound);
    }

    Ok(())
}

/// Get the user's expenses that match `filter`, newest first.
///
/// All matching expenses are returned when `window` is `None`.
///
/// # Errors
/// Returns an [Error::SqlError] if there is some SQL error.
pub fn get_expenses(
    user_id: UserID,
    filter: &ExpenseFilter,
    window: Option<QueryWindow>,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    let (where_clause, mut params) = filter.where_clause(user_id);

    // Sort by creation time too so that expenses on the same date keep a stable order.
    let mut query = format!(
        "SELECT {EXPENSE_COLUMNS} FROM expense {where_clause} ORDER BY date DESC, created_at DESC, id ASC"
    );

    if let Some(window) = window {
        query.push_str(" LIMIT ? OFFSET ?");
        params.push(Box::new(clamp_to_i64(window.limit)));
        params.push(Box::new(clamp_to_i64(window.offset)));
    }

    connection
        .prepare(&query)?
        .query_map(params_from_iter(params.iter()), map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}

/// Count the user's expenses that match `filter`.
///
/// # Errors
/// Returns an [Error::SqlError] if there is some SQL error.
pub fn count_expenses(
    user_id: UserID,
    filter: &ExpenseFilter,
    connection: &Connection,
) -> Result<u64, Error> {
    let (where_clause, params) = filter.where_clause(user_id);

    connection
        .query_row(
            &format!("SELECT COUNT(id) FROM expense {where_clause}"),
            params_from_iter(params.iter()),
            |row| row.get::<_, i64>(0),
        )
        .map(|count| u64::try_from(count).unwrap_or_default())
        .map_err(|error| error.into())
}

/// Count the user's expenses that refer to `category_id`.
///
/// # Errors
/// Returns an [Error::SqlError] if there is some SQL error.
pub fn count_expenses_with_category(
    category_id: &str,
    user_id: UserID,
    connection: &Connection,
) -> Result<u64, Error> {
    let filter = ExpenseFilter {
        category: Some(category_id.to_owned()),
        ..Default::default()
    };

    count_expenses(user_id, &filter, connection)
}

/// Get the dates of the user's oldest and newest expenses.
///
/// Returns `None` if the user has no expenses.
///
/// # Errors
/// Returns an [Error::SqlError] if there is some SQL error.
pub fn get_expense_date_bounds(
    user_id: UserID,
    connection: &Connection,
) -> Result<Option<(PrimitiveDateTime, PrimitiveDateTime)>, Error> {
    let (earliest, latest): (Option<String>, Option<String>) = connection.query_row(
        "SELECT MIN(date), MAX(date) FROM expense WHERE user_id = ?1",
        [user_id.as_i64()],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    match (earliest, latest) {
        (Some(earliest), Some(latest)) => Ok(Some((
            parse_stored_date_time(&earliest)?,
            parse_stored_date_time(&latest)?,
        ))),
        _ => Ok(None),
    }
}

/// Create the expense table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS expense (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            amount REAL NOT NULL CHECK (amount > 0),
            date TEXT NOT NULL,
            category TEXT NOT NULL,
            description TEXT,
            user_id INTEGER NOT NULL,
            created_at TEXT NOT NULL DEFAULT ({SQL_NOW}),
            updated_at TEXT NOT NULL DEFAULT ({SQL_NOW}),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_expense_user_date ON expense(user_id, date);
        CREATE INDEX IF NOT EXISTS idx_expense_user_category ON expense(user_id, category);"
    ))?;

    Ok(())
}

/// Map a database row to an [Expense].
fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let id = row.get(0)?;
    let title = row.get(1)?;
    let amount = row.get(2)?;
    let date = date_time_from_row(row, 3)?;
    let category = row.get(4)?;
    let description = row.get(5)?;
    let raw_user_id = row.get(6)?;
    let created_at = timestamp_from_row(row, 7)?;
    let updated_at = timestamp_from_row(row, 8)?;

    Ok(Expense {
        id,
        title,
        amount,
        date,
        category,
        description,
        user_id: UserID::new(raw_user_id),
        created_at,
        updated_at,
    })
}

fn parse_stored_date_time(raw: &str) -> Result<PrimitiveDateTime, Error> {
    parse_date_time(raw, DateBound::Start, UtcOffset::UTC)
}

// SQLite integers are signed.
fn clamp_to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

// ============================================================================
// TESTS
// ============================================================================
