use rusqlite::Connection;

use crate::{
    PasswordHash,
    auth::{User, create_user},
    db::initialize,
};

pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not create in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");

    connection
}

/// Insert a user with a dummy password hash.
pub(crate) fn insert_test_user(email: &str, connection: &Connection) -> User {
    create_user(
        "Test User",
        email,
        PasswordHash::new_unchecked("hunter2"),
        connection,
    )
    .expect("Could not create test user")
}
