//! Field-level input validation.
//!
//! Validation runs before any storage call, so a rejected input never causes
//! a partial write.

use std::ops::RangeInclusive;

use thiserror::Error;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Name of the offending field as submitted by the client.
    pub field: &'static str,
    /// Human-readable explanation.
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Require `value` (after trimming) to be non-empty.
///
/// # Errors
///
/// Returns a [`ValidationError`] naming `field` when the value is blank.
pub fn require_present(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    Ok(())
}

/// Require the character count of `value` (after trimming) to fall in `bounds`.
///
/// # Errors
///
/// Returns a [`ValidationError`] naming `field` when the length is out of range.
pub fn require_length(
    field: &'static str,
    value: &str,
    bounds: RangeInclusive<usize>,
) -> Result<(), ValidationError> {
    let len = value.trim().chars().count();
    if !bounds.contains(&len) {
        return Err(ValidationError::new(
            field,
            format!(
                "must be between {} and {} characters",
                bounds.start(),
                bounds.end()
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // Four characters, eight bytes.
        assert!(require_length("name", "ßßßß", 2..=4).is_ok());
    }

    #[test]
    fn test_length_trims_before_counting() {
        let err = require_length("name", "  a  ", 2..=50).unwrap_err();
        assert_eq!(err.field, "name");
        assert_eq!(err.message, "must be between 2 and 50 characters");
        assert_eq!(err.to_string(), "name: must be between 2 and 50 characters");
    }

    #[test]
    fn test_present_rejects_whitespace() {
        assert!(require_present("subject", " \n").is_err());
        assert!(require_present("subject", "help").is_ok());
    }
}
