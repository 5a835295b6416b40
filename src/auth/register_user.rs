//! The route for registering new users.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, FieldError,
    auth::{
        PasswordHash, ValidatedPassword,
        user::{PublicUser, create_user, normalize_email},
    },
    db::lock_connection,
    validation::is_valid_email,
};

/// The state needed to register a user.
#[derive(Debug, Clone)]
pub struct RegisterState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The bcrypt cost used when hashing new passwords.
    pub hash_cost: u32,
}

impl FromRef<AppState> for RegisterState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            hash_cost: PasswordHash::DEFAULT_COST,
        }
    }
}

/// The details submitted when signing up.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Create a new user and return their public details with a 201 status.
///
/// Every invalid field is reported at once in a 400 response.
pub async fn register_user(
    State(state): State<RegisterState>,
    Json(form): Json<RegisterForm>,
) -> Response {
    match register(&state, form) {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(error) => error.into_json_response("Failed to register user"),
    }
}

fn register(state: &RegisterState, form: RegisterForm) -> Result<PublicUser, Error> {
    let name = form.name.trim();
    let email = normalize_email(&form.email);
    let mut field_errors = Vec::new();

    if name.is_empty() {
        field_errors.push(FieldError::new("name", "Name is required"));
    }

    if !is_valid_email(&email) {
        field_errors.push(FieldError::new("email", "Invalid email address"));
    }

    let password = match ValidatedPassword::new(&form.password, &[name, email.as_str()]) {
        Ok(password) => Some(password),
        Err(Error::TooWeak(feedback)) => {
            let message = if feedback.is_empty() {
                "Password is too weak".to_owned()
            } else {
                format!("Password is too weak: {feedback}")
            };
            field_errors.push(FieldError::new("password", &message));
            None
        }
        Err(error) => return Err(error),
    };

    let Some(password) = password.filter(|_| field_errors.is_empty()) else {
        return Err(Error::Validation(field_errors));
    };

    let password_hash = PasswordHash::new(password, state.hash_cost)?;
    let connection = lock_connection(&state.db_connection)?;

    create_user(name, &email, password_hash, &connection).map(PublicUser::from)
}
