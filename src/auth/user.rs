//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::PasswordHash,
    date_time::{SQL_NOW, timestamp_from_row},
};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The user's display name.
    pub name: String,
    /// The user's email address, stored in lower case.
    pub email: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// When the user registered.
    pub created_at: OffsetDateTime,
}

/// The fields of a [User] that may be sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: UserID,
    pub name: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT ({SQL_NOW})
                )"
        ),
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateEmail] if `email` is already registered,
/// - or [Error::SqlError] if some other SQL related error occurred.
pub fn create_user(
    name: &str,
    email: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    connection
        .prepare(
            "INSERT INTO user (name, email, password) VALUES (?1, ?2, ?3)
             RETURNING id, name, email, password, created_at",
        )?
        .query_row((name, email, password_hash.as_ref()), map_user_row)
        .map_err(|error| error.into())
}

/// Get the user from the database with the email address `email`.
///
/// # Errors
///
/// This function will return an error if:
/// - `email` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, name, email, password, created_at FROM user WHERE email = :email")?
        .query_row(&[(":email", email)], map_user_row)
        .map_err(|error| error.into())
}

/// Check whether `email` belongs to a registered user.
pub fn email_exists(email: &str, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM user WHERE email = ?1)",
            [email],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Trim and lower-case an email address so that lookups ignore case.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_id = row.get(0)?;
    let name = row.get(1)?;
    let email = row.get(2)?;
    let raw_password_hash: String = row.get(3)?;
    let created_at = timestamp_from_row(row, 4)?;

    Ok(User {
        id: UserID::new(raw_id),
        name,
        email,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        created_at,
    })
}

#[cfg(test)]
mod user_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        auth::{PasswordHash, create_user},
    };

    use super::{create_user_table, email_exists, get_user_by_email, normalize_email};

    fn get_db_connection() -> Connection {
        let conn =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        create_user_table(&conn).expect("Could not create user table");

        conn
    }

    #[test]
    fn insert_user_succeeds() {
        let db_connection = get_db_connection();
        let password_hash = PasswordHash::new_unchecked("hunter2");

        let inserted_user = create_user(
            "Jane",
            "jane@example.com",
            password_hash.clone(),
            &db_connection,
        )
        .unwrap();

        assert!(inserted_user.id.as_i64() > 0);
        assert_eq!(inserted_user.name, "Jane");
        assert_eq!(inserted_user.email, "jane@example.com");
        assert_eq!(inserted_user.password_hash, password_hash);
    }

    #[test]
    fn insert_user_fails_on_duplicate_email() {
        let db_connection = get_db_connection();
        create_user(
            "Jane",
            "jane@example.com",
            PasswordHash::new_unchecked("hunter2"),
            &db_connection,
        )
        .unwrap();

        let result = create_user(
            "Other Jane",
            "jane@example.com",
            PasswordHash::new_unchecked("hunter3"),
            &db_connection,
        );

        assert_eq!(result, Err(Error::DuplicateEmail));
    }

    #[test]
    fn get_user_by_email_succeeds() {
        let db_connection = get_db_connection();
        let test_user = create_user(
            "Jane",
            "jane@example.com",
            PasswordHash::new_unchecked("hunter2"),
            &db_connection,
        )
        .unwrap();

        let retrieved_user = get_user_by_email("jane@example.com", &db_connection).unwrap();

        assert_eq!(retrieved_user, test_user);
        assert_eq!(
            get_user_by_email("john@example.com", &db_connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn email_exists_reports_registered_addresses() {
        let db_connection = get_db_connection();
        create_user(
            "Jane",
            "jane@example.com",
            PasswordHash::new_unchecked("hunter2"),
            &db_connection,
        )
        .unwrap();

        assert_eq!(email_exists("jane@example.com", &db_connection), Ok(true));
        assert_eq!(email_exists("john@example.com", &db_connection), Ok(false));
    }

    #[test]
    fn normalize_email_ignores_case_and_whitespace() {
        assert_eq!(normalize_email("  Jane@Example.COM "), "jane@example.com");
    }
}
