//! Core category domain types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, FieldError, UserID, validation::is_valid_hex_color};

/// The color given to categories created without one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#6366F1";

/// The icon given to categories created without one.
pub const DEFAULT_CATEGORY_ICON: &str = "tag";

/// The longest allowed category name, in characters.
const MAX_NAME_LENGTH: usize = 50;

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name from user input.
    ///
    /// Leading and trailing whitespace is removed.
    ///
    /// # Errors
    ///
    /// Returns a [FieldError] for the "name" field if `name` is blank or
    /// longer than 50 characters.
    pub fn new(name: &str) -> Result<Self, FieldError> {
        let name = name.trim();

        if name.is_empty() {
            Err(FieldError::new("name", "Category name is required"))
        } else if name.chars().count() > MAX_NAME_LENGTH {
            Err(FieldError::new(
                "name",
                "Category name must be less than 50 characters",
            ))
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier for a category, a lower-case hex string.
pub type CategoryId = String;

/// A user defined grouping for expenses, e.g. 'Groceries' or 'Rent'.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: CategoryName,
    /// A hex color string such as "#6366F1".
    pub color: String,
    pub icon: String,
    pub user_id: UserID,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The request body for creating or updating a category.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// A [CategoryForm] that passed validation.
///
/// `color` and `icon` are `None` when the client left them out.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryFields {
    pub name: CategoryName,
    pub color: Option<String>,
    pub icon: Option<String>,
}

impl CategoryForm {
    /// Check every field of the form.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] listing each invalid field.
    pub fn validate(self) -> Result<CategoryFields, Error> {
        let mut field_errors = Vec::new();

        let name = CategoryName::new(&self.name).map_err(|error| field_errors.push(error));

        let color = self.color.map(|color| color.trim().to_owned());
        if let Some(color) = &color
            && !is_valid_hex_color(color)
        {
            field_errors.push(FieldError::new("color", "Invalid color format"));
        }

        let icon = self
            .icon
            .map(|icon| icon.trim().to_owned())
            .filter(|icon| !icon.is_empty());

        match name {
            Ok(name) if field_errors.is_empty() => Ok(CategoryFields { name, color, icon }),
            _ => Err(Error::Validation(field_errors)),
        }
    }
}

#[cfg(test)]
mod category_name_tests {
    use crate::{FieldError, category::CategoryName};

    #[test]
    fn new_fails_on_empty_string() {
        assert_eq!(
            CategoryName::new(""),
            Err(FieldError::new("name", "Category name is required"))
        );
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        assert_eq!(
            CategoryName::new("\n\t \r"),
            Err(FieldError::new("name", "Category name is required"))
        );
    }

    #[test]
    fn new_accepts_fifty_characters() {
        let name = "é".repeat(50);

        assert_eq!(CategoryName::new(&name), Ok(CategoryName::new_unchecked(&name)));
    }

    #[test]
    fn new_fails_on_fifty_one_characters() {
        assert!(CategoryName::new(&"a".repeat(51)).is_err());
    }

    #[test]
    fn new_trims_whitespace() {
        assert_eq!(
            CategoryName::new("  Groceries "),
            Ok(CategoryName::new_unchecked("Groceries"))
        );
    }
}
