//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time, providing immediate feedback for invalid values.

use crate::domain::{MAX_BIO_LENGTH, MAX_NAME_LENGTH};
use chrono::NaiveDate;

/// Validate id prefix format.
///
/// Delegates to `commands::init` so the rules live in one place.
pub fn validate_prefix(s: &str) -> Result<String, String> {
    use crate::commands::init;

    let trimmed = s.trim();
    init::validate_prefix(trimmed).map_err(|e| e.to_string())?;
    Ok(trimmed.to_string())
}

/// Validate a person id.
///
/// Generated ids look like `smith-a1b2`, but imported records may carry
/// any id, so only emptiness, whitespace and control characters are
/// rejected.
pub fn validate_person_id(s: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Person ID cannot be empty".to_string());
    }

    if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(format!(
            "Invalid person ID '{}': whitespace and control characters are not allowed",
            s.escape_debug()
        ));
    }

    Ok(s.to_string())
}

/// Validate a display name.
///
/// Names are single-line and at most [`MAX_NAME_LENGTH`] characters after
/// trimming.
pub fn validate_name(s: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Name cannot be empty".to_string());
    }

    let length = s.chars().count();
    if length > MAX_NAME_LENGTH {
        return Err(format!(
            "Name cannot exceed {MAX_NAME_LENGTH} characters, got {length} characters"
        ));
    }

    if s.contains('\n') || s.contains('\r') {
        return Err("Name cannot contain newline characters".to_string());
    }

    if let Some(pos) = s.chars().position(|c| c.is_control() && c != '\t') {
        return Err(format!(
            "Name contains invalid control character at position {pos}"
        ));
    }

    Ok(s.to_string())
}

/// Validate a biography.
///
/// Allows newlines but rejects other control characters.
pub fn validate_bio(s: &str) -> Result<String, String> {
    let length = s.chars().count();
    if length > MAX_BIO_LENGTH {
        return Err(format!(
            "Bio cannot exceed {MAX_BIO_LENGTH} characters, got {length} characters"
        ));
    }

    if let Some(pos) = s
        .chars()
        .position(|c| c.is_control() && !matches!(c, '\t' | '\n' | '\r'))
    {
        return Err(format!("Bio contains invalid control character at position {pos}"));
    }

    Ok(s.to_string())
}

/// Parse a calendar date in `YYYY-MM-DD` form.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{}': {e} (expected YYYY-MM-DD)", s.trim()))
}
