//! Endpoint for recording a new expense.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, UserID, endpoints,
    db::lock_connection,
    expense::{ExpenseForm, create_expense},
    timezone::local_offset_or_error,
};

/// The state needed for creating an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Record an expense for the user and respond with it and a 201 status.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    Extension(user_id): Extension<UserID>,
    Json(form): Json<ExpenseForm>,
) -> Response {
    let expense = local_offset_or_error(&state.local_timezone)
        .and_then(|local_offset| form.validate(local_offset))
        .and_then(|fields| {
            let connection = lock_connection(&state.db_connection)?;
            create_expense(fields, user_id, &connection)
        });

    match expense {
        Ok(expense) => {
            let location = endpoints::format_endpoint(endpoints::EXPENSE, &expense.id);
            (StatusCode::CREATED, [(LOCATION, location)], Json(expense)).into_response()
        }
        Err(error) => error.into_json_response("Failed to create expense"),
    }
}
