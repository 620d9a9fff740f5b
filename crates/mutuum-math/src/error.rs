//! Error types for the math crate.

use thiserror::Error;

/// A specialized Result type for math operations.
pub type MathResult<T> = Result<T, MathError>;

/// Errors produced by the root-finding kernels.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum MathError {
    /// The endpoints do not bracket a root.
    #[error("Invalid bracket [{a}, {b}]: f(a) = {fa}, f(b) = {fb} do not change sign")]
    InvalidBracket {
        /// Lower endpoint.
        a: f64,
        /// Upper endpoint.
        b: f64,
        /// Function value at the lower endpoint.
        fa: f64,
        /// Function value at the upper endpoint.
        fb: f64,
    },

    /// The iteration budget ran out before reaching tolerance.
    #[error("Convergence failed after {iterations} iterations (residual: {residual})")]
    ConvergenceFailed {
        /// Number of iterations attempted.
        iterations: u32,
        /// Magnitude of the final residual.
        residual: f64,
    },
}

impl MathError {
    /// Creates a convergence failure error.
    #[must_use]
    pub fn convergence_failed(iterations: u32, residual: f64) -> Self {
        Self::ConvergenceFailed {
            iterations,
            residual,
        }
    }
}
