//! Error types for the core crate.

use thiserror::Error;

/// A specialized Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// The main error type for core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A caller-supplied value failed validation.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of the rejected input.
        message: String,
    },

    /// A date or datetime could not be parsed or constructed.
    #[error("Invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },

    /// An interest-rate string could not be parsed.
    #[error("Invalid rate format: '{input}'. Expected '<value>[%] <period>' (e.g. '5.25% a', '0.004167 monthly', '1% a.m.')")]
    InvalidRate {
        /// The string that failed to parse.
        input: String,
    },

    /// A monetary amount could not be parsed or was not finite.
    #[error("Invalid money amount: {message}")]
    InvalidMoney {
        /// Description of the amount error.
        message: String,
    },
}

impl CoreError {
    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates an invalid date error.
    #[must_use]
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }

    /// Creates an invalid rate error.
    #[must_use]
    pub fn invalid_rate(input: impl Into<String>) -> Self {
        Self::InvalidRate {
            input: input.into(),
        }
    }

    /// Creates an invalid money error.
    #[must_use]
    pub fn invalid_money(message: impl Into<String>) -> Self {
        Self::InvalidMoney {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::invalid_date("2024-02-30 is not a valid date");
        assert!(err.to_string().contains("Invalid date"));
    }

    #[test]
    fn test_rate_error_mentions_format() {
        let err = CoreError::invalid_rate("5.25%%");
        assert!(err.to_string().contains("Expected"));
    }
}
