//! Database operations for categories.

use rusqlite::{Connection, Row};
use uuid::Uuid;

use crate::{
    Error, UserID,
    category::{
        Category, CategoryFields, CategoryName, DEFAULT_CATEGORY_COLOR, DEFAULT_CATEGORY_ICON,
    },
    date_time::{SQL_NOW, timestamp_from_row},
};

const CATEGORY_COLUMNS: &str = "id, name, color, icon, user_id, created_at, updated_at";

/// Create a category owned by `user_id` and return it with its generated ID.
///
/// Missing colors and icons are replaced with the defaults.
///
/// # Errors
///
/// Returns an [Error::DuplicateCategoryName] if the user already has a
/// category called `fields.name`.
pub fn create_category(
    fields: CategoryFields,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    let id = Uuid::new_v4().simple().to_string();
    let color = fields
        .color
        .unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_owned());
    let icon = fields
        .icon
        .unwrap_or_else(|| DEFAULT_CATEGORY_ICON.to_owned());

    connection
        .prepare(&format!(
            "INSERT INTO category (id, name, color, icon, user_id) VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING {CATEGORY_COLUMNS}"
        ))?
        .query_row(
            (id, fields.name.as_ref(), color, icon, user_id.as_i64()),
            map_category_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve one of the user's categories by ID.
///
/// # Errors
///
/// Returns an [Error::CategoryNotFound] if the user has no category with
/// `category_id`.
pub fn get_category(
    category_id: &str,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category WHERE id = :id AND user_id = :user_id"
        ))?
        .query_row(
            rusqlite::named_params! {":id": category_id, ":user_id": user_id.as_i64()},
            map_category_row,
        )
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::CategoryNotFound,
            error => error,
        })
}

/// Retrieve all of the user's categories ordered alphabetically by name.
pub fn get_all_categories(user_id: UserID, connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category WHERE user_id = ?1 ORDER BY name ASC"
        ))?
        .query_map([user_id.as_i64()], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Update one of the user's categories and return the new version.
///
/// The color and icon are left unchanged when `fields` omits them.
///
/// # Errors
///
/// Returns an:
/// - [Error::CategoryNotFound] if the user has no category with `category_id`,
/// - [Error::DuplicateCategoryName] if the new name is taken by another of
///   the user's categories.
pub fn update_category(
    category_id: &str,
    fields: CategoryFields,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(&format!(
            "UPDATE category
             SET name = ?1, color = COALESCE(?2, color), icon = COALESCE(?3, icon),
                 updated_at = {SQL_NOW}
             WHERE id = ?4 AND user_id = ?5
             RETURNING {CATEGORY_COLUMNS}"
        ))?
        .query_row(
            (
                fields.name.as_ref(),
                fields.color,
                fields.icon,
                category_id,
                user_id.as_i64(),
            ),
            map_category_row,
        )
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::CategoryNotFound,
            error => error,
        })
}

/// Delete one of the user's categories.
///
/// This does not check whether expenses still refer to the category, see
/// [crate::expense::count_expenses_with_category].
///
/// # Errors
///
/// Returns an [Error::CategoryNotFound] if the user has no category with
/// `category_id`.
pub fn delete_category(
    category_id: &str,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (category_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::CategoryNotFound);
    }

    Ok(())
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS category (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            color TEXT NOT NULL DEFAULT '{DEFAULT_CATEGORY_COLOR}',
            icon TEXT NOT NULL DEFAULT '{DEFAULT_CATEGORY_ICON}',
            user_id INTEGER NOT NULL,
            created_at TEXT NOT NULL DEFAULT ({SQL_NOW}),
            updated_at TEXT NOT NULL DEFAULT ({SQL_NOW}),
            UNIQUE(name, user_id),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user ON category(user_id);"
    ))?;

    Ok(())
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let color = row.get(2)?;
    let icon = row.get(3)?;
    let raw_user_id = row.get(4)?;
    let created_at = timestamp_from_row(row, 5)?;
    let updated_at = timestamp_from_row(row, 6)?;

    Ok(Category {
        id,
        name: CategoryName::new_unchecked(&raw_name),
        color,
        icon,
        user_id: UserID::new(raw_user_id),
        created_at,
        updated_at,
    })
}
