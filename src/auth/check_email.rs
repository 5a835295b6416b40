//! Lets the sign-up form warn about taken email addresses before submitting.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::user::{email_exists, normalize_email},
    db::lock_connection,
    validation::is_valid_email,
};

#[derive(Debug, Clone)]
pub struct CheckEmailState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CheckEmailState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckEmailRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct CheckEmailResponse {
    pub exists: bool,
}

/// Report whether an email address is already registered.
pub async fn check_email(
    State(state): State<CheckEmailState>,
    Json(request): Json<CheckEmailRequest>,
) -> Response {
    let email = normalize_email(&request.email);

    if !is_valid_email(&email) {
        return Error::InvalidEmail.into_json_response("Invalid email address");
    }

    let exists = lock_connection(&state.db_connection)
        .and_then(|connection| email_exists(&email, &connection));

    match exists {
        Ok(exists) => Json(CheckEmailResponse { exists }).into_response(),
        Err(error) => error.into_json_response("Failed to check email. Please try again."),
    }
}

#[cfg(test)]
mod check_email_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, extract::State, http::StatusCode};

    use crate::test_utils::{get_test_connection, insert_test_user, parse_json};

    use super::{CheckEmailRequest, CheckEmailState, check_email};

    fn get_test_state() -> CheckEmailState {
        let connection = get_test_connection();
        insert_test_user("jane@example.com", &connection);

        CheckEmailState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn request(email: &str) -> Json<CheckEmailRequest> {
        Json(CheckEmailRequest {
            email: email.to_owned(),
        })
    }

    #[tokio::test]
    async fn registered_email_exists() {
        let response = check_email(State(get_test_state()), request("JANE@example.com")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(parse_json(response).await["exists"], true);
    }

    #[tokio::test]
    async fn unregistered_email_does_not_exist() {
        let response = check_email(State(get_test_state()), request("john@example.com")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(parse_json(response).await["exists"], false);
    }

    #[tokio::test]
    async fn malformed_email_is_a_bad_request() {
        let response = check_email(State(get_test_state()), request("john")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(parse_json(response).await["error"], "Invalid email address");
    }
}
