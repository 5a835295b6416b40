//! Endpoints for reading and updating a single expense.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, UserID,
    db::lock_connection,
    expense::{ExpenseForm, ExpenseId, get_expense, update_expense},
    timezone::local_offset_or_error,
};

/// The state needed for reading or updating an expense.
#[derive(Debug, Clone)]
pub struct EditExpenseState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Get one of the user's expenses.
pub async fn get_expense_endpoint(
    State(state): State<EditExpenseState>,
    Extension(user_id): Extension<UserID>,
    Path(expense_id): Path<ExpenseId>,
) -> Response {
    let expense = lock_connection(&state.db_connection)
        .and_then(|connection| get_expense(&expense_id, user_id, &connection));

    match expense {
        Ok(expense) => Json(expense).into_response(),
        Err(error) => error.into_json_response("Failed to fetch expense"),
    }
}

/// Replace the fields of one of the user's expenses.
pub async fn update_expense_endpoint(
    State(state): State<EditExpenseState>,
    Extension(user_id): Extension<UserID>,
    Path(expense_id): Path<ExpenseId>,
    Json(form): Json<ExpenseForm>,
) -> Response {
    let expense = local_offset_or_error(&state.local_timezone)
        .and_then(|local_offset| form.validate(local_offset))
        .and_then(|fields| {
            let connection = lock_connection(&state.db_connection)?;
            update_expense(&expense_id, fields, user_id, &connection)
        });

    match expense {
        Ok(expense) => Json(expense).into_response(),
        Err(error) => error.into_json_response("Failed to update expense"),
    }
}

#[cfg(test)]
mod edit_expense_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Json,
        extract::{Path, State},
        http::StatusCode,
    };
    use time::macros::datetime;

    use crate::{
        UserID,
        expense::{Expense, ExpenseFields, ExpenseForm, create_expense},
        test_utils::{get_test_connection, insert_test_user, parse_json},
    };

    use super::{EditExpenseState, get_expense_endpoint, update_expense_endpoint};

    fn get_test_state() -> (EditExpenseState, UserID, Expense) {
        let connection = get_test_connection();
        let user = insert_test_user("jane@example.com", &connection);
        let expense = create_expense(
            ExpenseFields {
                title: "Bus".to_owned(),
                amount: 3.5,
                date: datetime!(2024-05-01 8:15),
                category: "transport".to_owned(),
                description: None,
            },
            user.id,
            &connection,
        )
        .unwrap();

        let state = EditExpenseState {
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: Arc::new(Mutex::new(connection)),
        };

        (state, user.id, expense)
    }

    #[tokio::test]
    async fn gets_expense() {
        let (state, user_id, expense) = get_test_state();

        let response =
            get_expense_endpoint(State(state), Extension(user_id), Path(expense.id.clone())).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_json(response).await;
        assert_eq!(body["id"], expense.id.as_str());
        assert_eq!(body["title"], "Bus");
        assert_eq!(body["date"], "2024-05-01T08:15:00");
        assert_eq!(body["description"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn other_users_expense_is_not_found() {
        let (state, _, expense) = get_test_state();

        let response = get_expense_endpoint(
            State(state),
            Extension(UserID::new(999)),
            Path(expense.id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(parse_json(response).await["error"], "Expense not found");
    }

    #[tokio::test]
    async fn updates_expense() {
        let (state, user_id, expense) = get_test_state();

        let response = update_expense_endpoint(
            State(state),
            Extension(user_id),
            Path(expense.id.clone()),
            Json(ExpenseForm {
                title: "Train".to_owned(),
                amount: Some(6.0),
                date: "2024-05-02T07:30".to_owned(),
                category: "transport".to_owned(),
                description: Some("Commute".to_owned()),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_json(response).await;
        assert_eq!(body["id"], expense.id.as_str());
        assert_eq!(body["title"], "Train");
        assert_eq!(body["amount"], 6.0);
        assert_eq!(body["date"], "2024-05-02T07:30:00");
        assert_eq!(body["description"], "Commute");
    }

    #[tokio::test]
    async fn update_of_missing_expense_is_not_found() {
        let (state, user_id, _) = get_test_state();

        let response = update_expense_endpoint(
            State(state),
            Extension(user_id),
            Path("missing".to_owned()),
            Json(ExpenseForm {
                title: "Train".to_owned(),
                amount: Some(6.0),
                date: "2024-05-02".to_owned(),
                category: "transport".to_owned(),
                description: None,
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
