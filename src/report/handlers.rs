//! The endpoints that serve chart data.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, UserID,
    category::get_all_categories,
    db::lock_connection,
    expense::{ExpenseFilter, get_expense_date_bounds, get_expenses},
    report::{
        category_totals::{CategoryTotal, total_by_category},
        daily::{DailyPoint, daily_totals},
        monthly::{MonthlyPoint, first_day_of_series, monthly_totals, parse_month_count},
        period::{DateFilter, resolve_date_range},
    },
    timezone::{local_now, local_offset_or_error},
};

/// The state needed for the report endpoints.
#[derive(Debug, Clone)]
pub struct ReportState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// Periods such as "current-month" are relative to the time in this timezone.
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters for reports over a period.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodQuery {
    /// One of "current-month", "last-3-months", "custom" or "all-time".
    pub period: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Only "day" is supported, other values are treated the same.
    pub group_by: Option<String>,
}

/// The query parameters for the monthly comparison report.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonthlyQuery {
    pub months: Option<String>,
}

impl PeriodQuery {
    fn date_filter(&self, local_timezone: &str) -> Result<DateFilter, Error> {
        let local_offset = local_offset_or_error(local_timezone)?;
        let now = local_now(local_timezone)?;

        resolve_date_range(
            self.period.as_deref(),
            self.start_date.as_deref(),
            self.end_date.as_deref(),
            now,
            local_offset,
        )
    }
}

/// Total the user's spending per category over a period, largest first.
pub async fn get_expenses_by_category(
    State(state): State<ReportState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<PeriodQuery>,
) -> Response {
    match category_report(&state, user_id, &query) {
        Ok(totals) => Json(totals).into_response(),
        Err(error) => error.into_json_response("Failed to fetch category distribution data"),
    }
}

fn category_report(
    state: &ReportState,
    user_id: UserID,
    query: &PeriodQuery,
) -> Result<Vec<CategoryTotal>, Error> {
    let filter = query
        .date_filter(&state.local_timezone)?
        .to_expense_filter();

    let connection = lock_connection(&state.db_connection)?;
    let expenses = get_expenses(user_id, &filter, None, &connection)?;
    let categories = get_all_categories(user_id, &connection)?;

    Ok(total_by_category(&expenses, &categories))
}

/// The user's spending on each day of a period.
///
/// Without a date restriction the series runs from the user's first to
/// last expense.
pub async fn get_expenses_by_time(
    State(state): State<ReportState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<PeriodQuery>,
) -> Response {
    match daily_report(&state, user_id, &query) {
        Ok(points) => Json(points).into_response(),
        Err(error) => error.into_json_response("Failed to fetch expense trends data"),
    }
}

fn daily_report(
    state: &ReportState,
    user_id: UserID,
    query: &PeriodQuery,
) -> Result<Vec<DailyPoint>, Error> {
    if let Some(group_by) = query.group_by.as_deref()
        && group_by != "day"
    {
        tracing::debug!("Unsupported groupBy value \"{group_by}\", grouping by day");
    }

    let date_filter = query.date_filter(&state.local_timezone)?;

    let connection = lock_connection(&state.db_connection)?;

    let (start, end) = match date_filter {
        DateFilter::Range { start, end } => (start, end),
        DateFilter::Unbounded => match get_expense_date_bounds(user_id, &connection)? {
            Some(bounds) => bounds,
            None => return Ok(Vec::new()),
        },
    };

    let expenses = get_expenses(
        user_id,
        &ExpenseFilter::in_range(start, end),
        None,
        &connection,
    )?;

    Ok(daily_totals(&expenses, start.date(), end.date()))
}

/// The user's spending in each of the last few months, including this one.
pub async fn get_expenses_by_month(
    State(state): State<ReportState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<MonthlyQuery>,
) -> Response {
    match monthly_report(&state, user_id, &query) {
        Ok(points) => Json(points).into_response(),
        Err(error) => error.into_json_response("Failed to fetch monthly comparison data"),
    }
}

fn monthly_report(
    state: &ReportState,
    user_id: UserID,
    query: &MonthlyQuery,
) -> Result<Vec<MonthlyPoint>, Error> {
    let month_count = parse_month_count(query.months.as_deref())?;
    let now = local_now(&state.local_timezone)?;
    let start = first_day_of_series(month_count, now.date()).midnight();

    let connection = lock_connection(&state.db_connection)?;
    let expenses = get_expenses(
        user_id,
        &ExpenseFilter::in_range(start, now),
        None,
        &connection,
    )?;

    Ok(monthly_totals(&expenses, month_count, now.date()))
}
