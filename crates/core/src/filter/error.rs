//! Filter error types.

use thiserror::Error;

/// Errors raised at the filter state boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// A user-supplied value could not be parsed.
    #[error("Invalid input for {field}: '{value}' ({reason})")]
    InvalidInput {
        /// Field being set.
        field: &'static str,
        /// Raw value received.
        value: String,
        /// What was expected.
        reason: &'static str,
    },
}

impl FilterError {
    /// Create an invalid date error.
    #[must_use]
    pub fn invalid_date(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            value: value.into(),
            reason: "expected a date formatted YYYY-MM-DD",
        }
    }

    /// Create an unknown period token error.
    #[must_use]
    pub fn unknown_period(value: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: "date_range",
            value: value.into(),
            reason: "expected month, quarter, year, last-month, last-quarter or last-year",
        }
    }

    /// Create an unknown option error.
    #[must_use]
    pub fn unknown_option(value: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: "options",
            value: value.into(),
            reason: "expected draft",
        }
    }
}
