//! SQL identifier checks.
//!
//! Table and column names are interpolated into statement text, so every one
//! of them must pass [`validate_identifier`] first. Values are always bound.

use crate::{Error, Result};

/// Longest identifier accepted.
const MAX_IDENTIFIER_LEN: usize = 64;

/// Check whether `name` is a plain SQL identifier.
///
/// An identifier starts with an ASCII letter or underscore and continues
/// with ASCII letters, digits or underscores.
///
/// # Examples
///
/// ```
/// use rowbound_common::ident::is_identifier;
///
/// assert!(is_identifier("user_profiles"));
/// assert!(is_identifier("_rowid"));
/// assert!(!is_identifier("1st"));
/// assert!(!is_identifier("name = 1 OR 1"));
/// ```
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    name.len() <= MAX_IDENTIFIER_LEN
        && (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Return `name` unchanged if it is a plain identifier.
pub fn validate_identifier(name: &str) -> Result<&str> {
    if is_identifier(name) {
        Ok(name)
    } else {
        Err(Error::InvalidIdentifier(name.to_string()))
    }
}
