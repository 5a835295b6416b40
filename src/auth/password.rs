//! Password strength checks and hashing.
//!
//! A raw password becomes a [ValidatedPassword] once zxcvbn rates it as hard
//! to guess, and a [PasswordHash] once it has been salted and hashed with bcrypt.

use std::fmt::Display;

use bcrypt::{hash, verify};
use serde::{Deserialize, Serialize};
use zxcvbn::{Score, feedback::Feedback, zxcvbn};

use crate::Error;

/// A password that zxcvbn considers strong, but has not been hashed yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Check the strength of `raw_password`.
    ///
    /// `user_inputs` are strings the user has entered elsewhere, such as their
    /// name and email. Passwords that reuse them are penalised.
    ///
    /// # Errors
    ///
    /// Returns an [Error::TooWeak] holding zxcvbn's suggestions when the
    /// password scores below three out of four.
    pub fn new(raw_password: &str, user_inputs: &[&str]) -> Result<Self, Error> {
        let password_analysis = zxcvbn(raw_password, user_inputs);

        match password_analysis.score() {
            Score::Three | Score::Four => Ok(Self(raw_password.to_string())),
            _ => Err(Error::TooWeak(
                password_analysis
                    .feedback()
                    .unwrap_or(&Feedback::default())
                    .to_string(),
            )),
        }
    }

    /// Create a new `ValidatedPassword` without any validation.
    ///
    /// The caller should ensure that `raw_password` is a valid and secure password.
    pub fn new_unchecked(raw_password: &str) -> Self {
        Self(raw_password.to_string())
    }
}

impl Display for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", str::repeat("*", 8))
    }
}

/// A salted and hashed password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// An alias for the default bcrypt cost.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash `password` with `cost` rounds of bcrypt.
    ///
    /// Use [PasswordHash::DEFAULT_COST] outside of tests.
    ///
    /// # Errors
    ///
    /// Returns an [Error::HashingError] if bcrypt fails.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        hash(&password.0, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Wrap an existing hash, e.g. one read from the database.
    ///
    /// The caller should ensure that `raw_password_hash` is a valid bcrypt hash.
    pub fn new_unchecked(raw_password_hash: &str) -> Self {
        Self(raw_password_hash.to_string())
    }

    /// Check that `raw_password` matches this hash.
    ///
    /// # Errors
    ///
    /// Returns an [Error::HashingError] if the stored hash is malformed.
    pub fn verify(&self, raw_password: &str) -> Result<bool, Error> {
        verify(raw_password, &self.0).map_err(|error| Error::HashingError(error.to_string()))
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
