//! Endpoint for deleting an expense.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde_json::json;

use crate::{
    AppState, UserID,
    db::lock_connection,
    expense::{ExpenseId, delete_expense},
};

/// The state needed for deleting an expense.
#[derive(Debug, Clone)]
pub struct DeleteExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Delete one of the user's expenses.
pub async fn delete_expense_endpoint(
    State(state): State<DeleteExpenseState>,
    Extension(user_id): Extension<UserID>,
    Path(expense_id): Path<ExpenseId>,
) -> Response {
    let result = lock_connection(&state.db_connection)
        .and_then(|connection| delete_expense(&expense_id, user_id, &connection));

    match result {
        Ok(()) => Json(json!({ "message": "Expense deleted successfully" })).into_response(),
        Err(error) => error.into_json_response("Failed to delete expense"),
    }
}
