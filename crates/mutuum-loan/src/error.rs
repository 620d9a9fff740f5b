//! Error types for the loan crate.

use mutuum_core::types::Money;
use mutuum_core::CoreError;
use mutuum_tvm::TvmError;
use thiserror::Error;

/// A specialized Result type for loan operations.
pub type LoanResult<T> = Result<T, LoanError>;

/// Errors produced by loan operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoanError {
    /// A caller-supplied value failed validation.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of the rejected input.
        message: String,
    },

    /// A warp target date could not be parsed or coerced.
    #[error("Invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },

    /// A second warp was attempted while one is active.
    #[error("Nested warps are not allowed; playing with time is dangerous enough with one level")]
    NestedWarp,

    /// A payment exceeds outstanding fines, accrued interest, and principal.
    #[error("Payment of {attempted} exceeds the amount owed ({maximum}); target installments explicitly to anticipate")]
    OverPayment {
        /// The rejected payment amount.
        attempted: Money,
        /// The most that could be absorbed.
        maximum: Money,
    },

    /// A payment was attempted on a fully paid loan.
    #[error("Loan is already paid off")]
    PaidOff,

    /// A TVM computation failed.
    #[error(transparent)]
    Tvm(#[from] TvmError),
}

impl LoanError {
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
}

impl From<CoreError> for LoanError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidDate { message } => LoanError::InvalidDate { message },
            other => LoanError::invalid_input(other.to_string()),
        }
    }
}

impl From<std::convert::Infallible> for LoanError {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}
