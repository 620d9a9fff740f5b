//! Secant root finder.

use crate::error::{MathError, MathResult};
use crate::solvers::{SolverConfig, SolverResult};

/// Secant open root finder.
///
/// Iterates on the line through the last two estimates. No bracket is
/// required, which is exactly why it is only a fallback: on the non-smooth
/// objectives this crate exists for it can wander, so callers validate the
/// result afterwards.
///
/// `x0` and `x1` are the two starting estimates.
pub fn secant<F>(f: F, x0: f64, x1: f64, config: &SolverConfig) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
{
    let mut prev = x0;
    let mut current = x1;
    let mut f_prev = f(prev);
    let mut f_current = f(current);

    for iteration in 0..config.max_iterations {
        if f_current.abs() < config.tolerance {
            return Ok(SolverResult {
                root: current,
                iterations: iteration,
                residual: f_current,
            });
        }

        let denominator = f_current - f_prev;
        if denominator.abs() < f64::EPSILON {
            // Flat segment; nudge instead of dividing by zero
            prev = current;
            f_prev = f_current;
            current += config.tolerance.max(1e-6);
            f_current = f(current);
            continue;
        }

        let next = current - f_current * (current - prev) / denominator;
        prev = current;
        f_prev = f_current;
        current = next;
        f_current = f(current);

        if (current - prev).abs() < config.tolerance {
            return Ok(SolverResult {
                root: current,
                iterations: iteration + 1,
                residual: f_current,
            });
        }
    }

    Err(MathError::convergence_failed(
        config.max_iterations,
        f_current.abs(),
    ))
}
