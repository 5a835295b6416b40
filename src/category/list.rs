//! Endpoints for reading categories.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, UserID,
    category::{CategoryId, get_all_categories, get_category},
    db::lock_connection,
};

/// The state needed for reading categories.
#[derive(Debug, Clone)]
pub struct CategoriesState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// List the user's categories sorted by name.
pub async fn get_categories_endpoint(
    State(state): State<CategoriesState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let categories = lock_connection(&state.db_connection)
        .and_then(|connection| get_all_categories(user_id, &connection));

    match categories {
        Ok(categories) => Json(categories).into_response(),
        Err(error) => error.into_json_response("Failed to fetch categories"),
    }
}

/// Get one of the user's categories.
pub async fn get_category_endpoint(
    State(state): State<CategoriesState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<CategoryId>,
) -> Response {
    let category = lock_connection(&state.db_connection)
        .and_then(|connection| get_category(&category_id, user_id, &connection));

    match category {
        Ok(category) => Json(category).into_response(),
        Err(error) => error.into_json_response("Failed to fetch category"),
    }
}
