//! Endpoint for updating categories.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, UserID,
    category::{CategoryForm, CategoryId, update_category},
    db::lock_connection,
};

/// The state needed for updating a category.
#[derive(Debug, Clone)]
pub struct UpdateCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Update one of the user's categories.
///
/// A color or icon left out of the request keeps its current value.
pub async fn update_category_endpoint(
    State(state): State<UpdateCategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<CategoryId>,
    Json(form): Json<CategoryForm>,
) -> Response {
    let category = form.validate().and_then(|fields| {
        let connection = lock_connection(&state.db_connection)?;
        update_category(&category_id, fields, user_id, &connection)
    });

    match category {
        Ok(category) => Json(category).into_response(),
        Err(error) => error.into_json_response("Failed to update category"),
    }
}
