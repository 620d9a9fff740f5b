//! Error types for the TVM crate.

use mutuum_math::MathError;
use thiserror::Error;

/// A specialized Result type for TVM operations.
pub type TvmResult<T> = Result<T, TvmError>;

/// Errors produced by the TVM solvers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TvmError {
    /// The cash flow has no live entries.
    #[error("Cash flow is empty")]
    EmptyCashFlow,

    /// IRR/MIRR need at least one inflow and one outflow.
    #[error("Cash flow needs both positive and negative entries")]
    NoSignChange,

    /// The solver failed tolerance or produced an implausible rate.
    #[error("Rate solver did not converge: {reason}")]
    NoConvergence {
        /// What went wrong.
        reason: String,
    },

    /// A caller-supplied value failed validation.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of the rejected input.
        message: String,
    },
}

impl TvmError {
    /// Creates a non-convergence error.
    #[must_use]
    pub fn no_convergence(reason: impl Into<String>) -> Self {
        Self::NoConvergence {
            reason: reason.into(),
        }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

impl From<MathError> for TvmError {
    fn from(err: MathError) -> Self {
        TvmError::no_convergence(err.to_string())
    }
}
