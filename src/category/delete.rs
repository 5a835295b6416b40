//! Endpoint for deleting categories.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde_json::json;

use crate::{
    AppState, Error, UserID,
    category::{CategoryId, delete_category},
    db::lock_connection,
    expense::count_expenses_with_category,
};

/// The state needed for deleting a category.
#[derive(Debug, Clone)]
pub struct DeleteCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Delete one of the user's categories.
///
/// The category is kept if any of the user's expenses still refer to it.
pub async fn delete_category_endpoint(
    State(state): State<DeleteCategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<CategoryId>,
) -> Response {
    match delete_unused_category(&state, &category_id, user_id) {
        Ok(()) => Json(json!({ "message": "Category deleted successfully" })).into_response(),
        Err(error) => error.into_json_response("Failed to delete category"),
    }
}

fn delete_unused_category(
    state: &DeleteCategoryState,
    category_id: &str,
    user_id: UserID,
) -> Result<(), Error> {
    let connection = lock_connection(&state.db_connection)?;

    let expense_count = count_expenses_with_category(category_id, user_id, &connection)?;
    if expense_count > 0 {
        tracing::debug!("Category {category_id} is used by {expense_count} expense(s)");
        return Err(Error::CategoryInUse(expense_count));
    }

    delete_category(category_id, user_id, &connection)
}
