//! Internal helpers for input validation.
//!
//! These utilities are **not** part of the public API. Field problems are
//! collected and reported together, one sentence per field.

use crate::{Amount, EngineError, ResultEngine};

#[derive(Debug, Default)]
pub(crate) struct Validator {
    errors: Vec<String>,
}

impl Validator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records `"{field} is required."` when `value` is missing.
    pub(crate) fn required<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.errors.push(format!("{field} is required."));
        }
        value
    }

    /// Records an error when the trimmed text is empty.
    pub(crate) fn required_text(&mut self, field: &str, value: &str) -> bool {
        if value.trim().is_empty() {
            self.errors.push(format!("{field} is required."));
            return false;
        }
        true
    }

    pub(crate) fn max_chars(&mut self, field: &str, value: Option<&str>, max: usize) {
        if value.is_some_and(|text| text.chars().count() > max) {
            self.errors
                .push(format!("{field} must be at most {max} characters."));
        }
    }

    pub(crate) fn max_precision(&mut self, field: &str, value: Option<Amount>) {
        if value.is_some_and(|amount| !amount.has_max_precision(2)) {
            self.errors
                .push(format!("{field} must have at most 2 decimal points."));
        }
    }

    pub(crate) fn positive(&mut self, field: &str, value: Option<Amount>) {
        if value.is_some_and(Amount::is_negative) {
            self.errors.push(format!("{field} must be positive."));
        }
    }

    pub(crate) fn non_zero(&mut self, field: &str, value: Option<Amount>) {
        if value.is_some_and(Amount::is_zero) {
            self.errors.push(format!("{field} must not be zero."));
        }
    }

    pub(crate) fn push(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub(crate) fn finish(self) -> ResultEngine<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Invalid(self.errors.join(" ")))
        }
    }
}

/// Trimmed text, `None` when blank.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}
