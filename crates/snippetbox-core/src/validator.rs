//! Field-level form validation.
//!
//! A [`Validator`] collects errors keyed by form field plus errors that
//! don't belong to any one field. Forms hold one as a named `validator`
//! field and run the free-standing predicates below through
//! [`Validator::check_field`].

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Pattern for checking the format of an email address (the WHATWG
/// `input[type=email]` grammar).
pub static EMAIL_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email regex should compile")
});

/// Accumulated validation errors for one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validator {
    /// Errors not tied to a specific field (e.g. bad credentials).
    pub non_field_errors: Vec<String>,
    /// First error recorded for each field.
    pub field_errors: HashMap<&'static str, String>,
}

impl Validator {
    /// True when no field or non-field errors have been recorded.
    pub fn valid(&self) -> bool {
        self.field_errors.is_empty() && self.non_field_errors.is_empty()
    }

    /// Record an error for `key` unless one is already present.
    pub fn add_field_error(&mut self, key: &'static str, message: impl Into<String>) {
        self.field_errors
            .entry(key)
            .or_insert_with(|| message.into());
    }

    pub fn add_non_field_error(&mut self, message: impl Into<String>) {
        self.non_field_errors.push(message.into());
    }

    /// Record `message` under `key` only if the check failed.
    pub fn check_field(&mut self, ok: bool, key: &'static str, message: &str) {
        if !ok {
            self.add_field_error(key, message);
        }
    }

    /// The error recorded for `key`, if any.
    pub fn field_error(&self, key: &str) -> Option<&str> {
        self.field_errors.get(key).map(String::as_str)
    }
}

/// True if the value contains something other than whitespace.
pub fn not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

/// True if the value has at most `n` characters.
pub fn max_chars(value: &str, n: usize) -> bool {
    value.chars().count() <= n
}

/// True if the value has at least `n` characters.
pub fn min_chars(value: &str, n: usize) -> bool {
    value.chars().count() >= n
}

pub fn matches(value: &str, rx: &Regex) -> bool {
    rx.is_match(value)
}

/// True if `value` equals one of `permitted`.
pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.contains(value)
}
