//! User Name Value Object
//!
//! The public handle of a user. Unique across the system, compared in its
//! canonical (lower-case) form.
//!
//! ## Invariants
//! - 3 to 30 characters after NFKC normalization and trimming
//! - Only `a-z`, `0-9`, `_`, `.`, `-`
//! - Starts and ends with a letter, digit or `_`
//! - No consecutive dots
//! - Not a reserved word

use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

use crate::error::AuthError;

pub const USER_NAME_MIN_LENGTH: usize = 3;
pub const USER_NAME_MAX_LENGTH: usize = 30;

const ALLOWED_SPECIAL_CHARS: &[char] = &['_', '.', '-'];

// Words that collide with routes or impersonate staff.
const RESERVED_WORDS: &[&str] = &[
    "admin",
    "administrator",
    "root",
    "system",
    "support",
    "api",
    "auth",
    "login",
    "logout",
    "register",
    "activate",
    "sessions",
    "stops",
    "me",
    "ufba",
    "buzufba",
    "null",
    "undefined",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserNameError {
    #[error("username is required")]
    Empty,

    #[error("username must be between {min} and {max} characters (got {length})")]
    Length { length: usize, min: usize, max: usize },

    #[error("username contains invalid character '{0}'; only a-z, 0-9, _, . and - are allowed")]
    InvalidCharacter(char),

    #[error("username must start and end with a letter, digit or underscore")]
    InvalidBoundary,

    #[error("username cannot contain consecutive dots")]
    ConsecutiveDots,

    #[error("'{0}' is a reserved username")]
    Reserved(String),
}

impl From<UserNameError> for AuthError {
    fn from(err: UserNameError) -> Self {
        AuthError::InvalidEntity(err.to_string())
    }
}

/// Validated, canonical user name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserName(String);

impl UserName {
    pub fn new(input: impl AsRef<str>) -> Result<Self, UserNameError> {
        let canonical = input
            .as_ref()
            .nfkc()
            .collect::<String>()
            .trim()
            .to_lowercase();
        Self::validate(&canonical)?;
        Ok(Self(canonical))
    }

    fn validate(canonical: &str) -> Result<(), UserNameError> {
        if canonical.is_empty() {
            return Err(UserNameError::Empty);
        }

        let length = canonical.chars().count();
        if !(USER_NAME_MIN_LENGTH..=USER_NAME_MAX_LENGTH).contains(&length) {
            return Err(UserNameError::Length {
                length,
                min: USER_NAME_MIN_LENGTH,
                max: USER_NAME_MAX_LENGTH,
            });
        }

        if let Some(bad) = canonical
            .chars()
            .find(|&c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || ALLOWED_SPECIAL_CHARS.contains(&c)))
        {
            return Err(UserNameError::InvalidCharacter(bad));
        }

        let boundary_ok = |c: Option<char>| {
            c.is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        };
        if !boundary_ok(canonical.chars().next()) || !boundary_ok(canonical.chars().next_back()) {
            return Err(UserNameError::InvalidBoundary);
        }

        if canonical.contains("..") {
            return Err(UserNameError::ConsecutiveDots);
        }

        if RESERVED_WORDS.contains(&canonical) {
            return Err(UserNameError::Reserved(canonical.to_string()));
        }

        Ok(())
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
