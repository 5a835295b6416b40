//! Endpoint for creating categories.

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
    category::{CategoryForm, create_category},
    db::lock_connection,
};

/// The state needed for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Create a category for the user and respond with it and a 201 status.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryState>,
    Extension(user_id): Extension<UserID>,
    Json(form): Json<CategoryForm>,
) -> Response {
    let category = form.validate().and_then(|fields| {
        let connection = lock_connection(&state.db_connection)?;
        create_category(fields, user_id, &connection)
    });

    match category {
        Ok(category) => {
            let location = endpoints::format_endpoint(endpoints::CATEGORY, &category.id);
            (StatusCode::CREATED, [(LOCATION, location)], Json(category)).into_response()
        }
        Err(error) => error.into_json_response("Failed to create category"),
    }
}
