//! Field-level validation shared by the create and update endpoints.

use serde::Serialize;

/// A validation failure for a single field of a submitted form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// The name of the offending field as it appears in the request body.
    pub field: String,
    /// A human readable explanation of what is wrong with the field.
    pub message: String,
}

impl FieldError {
    /// Create a new field error.
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_owned(),
            message: message.to_owned(),
        }
    }
}

/// Check that `email` looks like an email address, i.e. "local@domain.tld".
///
/// This only checks the shape of the address, it does not guarantee that the
/// address can receive mail.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Check that `color` is a hex color string in the `#RGB` or `#RRGGBB` form.
pub fn is_valid_hex_color(color: &str) -> bool {
    let Some(digits) = color.strip_prefix('#') else {
        return false;
    };

    (digits.len() == 3 || digits.len() == 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}
