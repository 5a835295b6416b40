//! Expense Tracker is a web service for recording personal expenses.
//!
//! Users sort their expenses into categories and the service reports totals
//! per category, per day and per month for charting. This library provides
//! the REST API, which speaks JSON.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
mod category;
mod date_time;
mod db;
mod endpoints;
mod expense;
mod logging;
mod not_found;
mod pagination;
mod report;
mod routing;
mod timezone;
mod validation;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{PasswordHash, User, UserID, ValidatedPassword};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use validation::FieldError;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an email and password combination that does not
    /// match a registered user.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The auth token cookie is missing from the cookie jar in the request.
    #[error("no auth token in the cookie jar")]
    CookieMissing,

    /// The auth token cookie could not be decoded or has expired.
    #[error("invalid auth token: {0}")]
    InvalidAuthToken(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The email address is not a plausible email address.
    #[error("invalid email address")]
    InvalidEmail,

    /// A user with the email address already exists.
    #[error("a user with this email already exists")]
    DuplicateEmail,

    /// One or more fields of a submitted form failed validation.
    #[error("validation failed: {0:?}")]
    Validation(Vec<FieldError>),

    /// A date or date-time string could not be parsed.
    #[error("could not parse \"{0}\" as a date")]
    InvalidDate(String),

    /// A query string parameter had a value that could not be used.
    ///
    /// Holds the parameter name and the raw value.
    #[error("invalid value \"{1}\" for query parameter {0}")]
    InvalidQueryParameter(&'static str, String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The expense does not exist or belongs to another user.
    #[error("the expense could not be found")]
    ExpenseNotFound,

    /// The category does not exist or belongs to another user.
    #[error("the category could not be found")]
    CategoryNotFound,

    /// The user already has a category with the same name.
    #[error("a category with this name already exists")]
    DuplicateCategoryName,

    /// Tried to delete a category that expenses still refer to.
    ///
    /// Holds the number of referencing expenses.
    #[error("the category is used by {0} expense(s)")]
    CategoryInUse(u64),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    && desc.contains("category.name") =>
            {
                Error::DuplicateCategoryName
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    && desc.contains("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.into_json_response("Internal server error")
    }
}

impl Error {
    /// Convert the error into a JSON response.
    ///
    /// Errors the client can act on get a specific status code and message.
    /// Everything else is logged and reported as a 500 with `context` as the
    /// message, e.g. "Failed to fetch expenses".
    pub(crate) fn into_json_response(self, context: &str) -> Response {
        match self {
            Error::Validation(details) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Validation failed", "details": details })),
            )
                .into_response(),
            Error::InvalidCredentials => {
                error_response(StatusCode::UNAUTHORIZED, "Invalid email or password")
            }
            Error::CookieMissing | Error::InvalidAuthToken(_) => {
                error_response(StatusCode::UNAUTHORIZED, "Unauthorized")
            }
            Error::TooWeak(feedback) => error_response(
                StatusCode::BAD_REQUEST,
                &format!("Password is too weak: {feedback}"),
            ),
            Error::InvalidEmail => error_response(StatusCode::BAD_REQUEST, "Invalid email address"),
            Error::DuplicateEmail => error_response(
                StatusCode::BAD_REQUEST,
                "User with this email already exists",
            ),
            Error::ExpenseNotFound => error_response(StatusCode::NOT_FOUND, "Expense not found"),
            Error::CategoryNotFound => error_response(StatusCode::NOT_FOUND, "Category not found"),
            Error::NotFound => error_response(
                StatusCode::NOT_FOUND,
                "The requested resource could not be found",
            ),
            Error::DuplicateCategoryName => error_response(
                StatusCode::BAD_REQUEST,
                "Category with this name already exists",
            ),
            Error::CategoryInUse(_) => error_response(
                StatusCode::BAD_REQUEST,
                "Cannot delete category that is being used by expenses",
            ),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("{context}: {error}");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, context)
            }
        }
    }
}

/// A JSON response of the form `{"error": message}`.
pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod error_response_tests {
    use axum::http::StatusCode;

    use crate::{Error, FieldError, test_utils::parse_json};

    #[tokio::test]
    async fn unexpected_errors_use_context_message() {
        let response = Error::DatabaseLockError.into_json_response("Failed to fetch expenses");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = parse_json(response).await;
        assert_eq!(body["error"], "Failed to fetch expenses");
    }

    #[tokio::test]
    async fn malformed_dates_are_reported_as_server_errors() {
        let response = Error::InvalidDate("yesterday".to_owned())
            .into_json_response("Failed to fetch expense trends data");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = parse_json(response).await;
        assert_eq!(body["error"], "Failed to fetch expense trends data");
    }

    #[tokio::test]
    async fn validation_errors_list_fields() {
        let response = Error::Validation(vec![FieldError::new("amount", "Amount must be positive")])
            .into_json_response("Failed to create expense");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = parse_json(response).await;
        assert_eq!(body["error"], "Validation failed");
        assert_eq!(body["details"][0]["field"], "amount");
        assert_eq!(body["details"][0]["message"], "Amount must be positive");
    }

    #[tokio::test]
    async fn category_in_use_is_a_bad_request() {
        let response = Error::CategoryInUse(2).into_json_response("Failed to delete category");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = parse_json(response).await;
        assert_eq!(
            body["error"],
            "Cannot delete category that is being used by expenses"
        );
    }
}
