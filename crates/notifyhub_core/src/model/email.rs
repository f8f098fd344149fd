//! Email entry validation and per-field editing helpers.
//!
//! # Responsibility
//! - Check address format with the registry's single regex rule.
//! - Keep one email field free of duplicates while it is being edited.
//!
//! # Invariants
//! - Stored entries are trimmed and match `EMAIL_RE`.
//! - Duplicate detection inside one field is exact (case-sensitive).

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static ENTRY_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,;\s]+").expect("valid separator regex"));

/// Rejection reasons for a single email entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailInputError {
    InvalidFormat(String),
    AlreadyPresent(String),
}

impl Display for EmailInputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFormat(_) => write!(f, "Invalid email format"),
            Self::AlreadyPresent(_) => write!(f, "Email already exists in this field"),
        }
    }
}

impl Error for EmailInputError {}

/// Returns whether `value` looks like a deliverable address.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Appends one trimmed entry to `field`.
///
/// Returns `Ok(false)` for blank input, which is ignored rather than rejected.
pub fn add_email(field: &mut Vec<String>, input: &str) -> Result<bool, EmailInputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(false);
    }
    if !is_valid_email(trimmed) {
        return Err(EmailInputError::InvalidFormat(trimmed.to_string()));
    }
    if field.iter().any(|existing| existing == trimmed) {
        return Err(EmailInputError::AlreadyPresent(trimmed.to_string()));
    }

    field.push(trimmed.to_string());
    Ok(true)
}

/// Appends every entry of a pasted `a@x.com; b@x.com` style string.
///
/// Entries before the first rejected one stay applied. Returns the number of
/// entries added.
pub fn add_emails(field: &mut Vec<String>, input: &str) -> Result<usize, EmailInputError> {
    let mut added = 0;
    for entry in ENTRY_SEPARATOR_RE.split(input) {
        if add_email(field, entry)? {
            added += 1;
        }
    }
    Ok(added)
}

/// Removes the entry at `index`, returning it when present.
pub fn remove_email(field: &mut Vec<String>, index: usize) -> Option<String> {
    if index < field.len() {
        Some(field.remove(index))
    } else {
        None
    }
}

/// Removes the last entry (backspace on an empty input box).
pub fn pop_email(field: &mut Vec<String>) -> Option<String> {
    field.pop()
}

#[cfg(test)]
mod tests {
    use super::{add_email, add_emails, is_valid_email, pop_email, remove_email, EmailInputError};

    #[test]
    fn format_check_matches_simple_addresses() {
        assert!(is_valid_email("ops@example.com"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
        assert!(!is_valid_email("ops@example"));
        assert!(!is_valid_email("ops example@x.com"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn add_email_trims_and_ignores_blank_input() {
        let mut field = Vec::new();
        assert_eq!(add_email(&mut field, "   "), Ok(false));
        assert_eq!(add_email(&mut field, "  a@x.com "), Ok(true));
        assert_eq!(field, vec!["a@x.com".to_string()]);
    }

    #[test]
    fn add_email_rejects_duplicates_within_field() {
        let mut field = vec!["a@x.com".to_string()];
        let err = add_email(&mut field, "a@x.com").unwrap_err();
        assert_eq!(err, EmailInputError::AlreadyPresent("a@x.com".to_string()));
        assert_eq!(err.to_string(), "Email already exists in this field");
        assert_eq!(field.len(), 1);
    }

    #[test]
    fn add_emails_splits_pasted_lists_and_stops_at_first_bad_entry() {
        let mut field = Vec::new();
        assert_eq!(add_emails(&mut field, "a@x.com; b@x.com,c@x.com"), Ok(3));

        let err = add_emails(&mut field, "d@x.com;nope;e@x.com").unwrap_err();
        assert!(matches!(err, EmailInputError::InvalidFormat(value) if value == "nope"));
        assert_eq!(field.last().map(String::as_str), Some("d@x.com"));
    }

    #[test]
    fn remove_and_pop_edit_in_place() {
        let mut field = vec!["a@x.com".to_string(), "b@x.com".to_string()];
        assert_eq!(remove_email(&mut field, 5), None);
        assert_eq!(remove_email(&mut field, 0).as_deref(), Some("a@x.com"));
        assert_eq!(pop_email(&mut field).as_deref(), Some("b@x.com"));
        assert_eq!(pop_email(&mut field), None);
    }
}
