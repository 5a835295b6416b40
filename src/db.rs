//! Database setup.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error, auth::create_user_table, category::create_category_table,
    expense::create_expense_table,
};

/// Create the application tables and indexes if they do not exist yet.
///
/// Foreign keys are switched on for the connection. Only the owner columns
/// reference another table; an expense's category is a plain string.
///
/// # Errors
/// Returns an [Error::SqlError] if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_expense_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Acquire the shared database connection.
///
/// # Errors
/// Returns an [Error::DatabaseLockError] if the lock is poisoned.
pub fn lock_connection(
    db_connection: &Arc<Mutex<Connection>>,
) -> Result<MutexGuard<'_, Connection>, Error> {
    db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}
