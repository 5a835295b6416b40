//! The route for handling log-in requests.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        cookie::set_auth_cookie,
        user::{PublicUser, User, get_user_by_email, normalize_email},
    },
    db::lock_connection,
};

/// How long the auth cookie should last if the user selects "remember me" at log-in.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The credentials sent by the client.
///
/// There is no need for validation here since they are compared against the
/// registered users.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogInData {
    pub email: String,
    pub password: String,
    /// Whether to extend the initial session duration.
    #[serde(default)]
    pub remember_me: bool,
}

/// Handler for log-in requests.
///
/// On success the auth cookie is set and the user is returned as JSON.
/// An unknown email or a wrong password both result in a 401 with the same
/// message, so clients cannot probe for registered emails here.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Json(user_data): Json<LogInData>,
) -> Response {
    let user = match verify_credentials(&state, &user_data) {
        Ok(user) => user,
        Err(error) => return error.into_json_response("Failed to log in"),
    };

    let cookie_duration = if user_data.remember_me {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    match set_auth_cookie(jar, user.id, cookie_duration) {
        Ok(jar) => (jar, Json(PublicUser::from(user))).into_response(),
        Err(error) => error.into_json_response("Failed to log in"),
    }
}

fn verify_credentials(state: &LoginState, user_data: &LogInData) -> Result<User, Error> {
    let email = normalize_email(&user_data.email);
    let connection = lock_connection(&state.db_connection)?;

    let user = match get_user_by_email(&email, &connection) {
        Ok(user) => user,
        Err(Error::NotFound) => return Err(Error::InvalidCredentials),
        Err(error) => return Err(error),
    };

    if user.password_hash.verify(&user_data.password)? {
        Ok(user)
    } else {
        Err(Error::InvalidCredentials)
    }
}
