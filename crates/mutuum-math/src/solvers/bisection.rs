//! Bisection root finder.

use crate::error::{MathError, MathResult};
use crate::solvers::{SolverConfig, SolverResult};

/// Bisection bracketed root finder.
///
/// Halves the bracket each step. Slow but unconditionally convergent given a
/// sign change; kept as the fallback when Brent's interpolation steps are not
/// wanted.
///
/// Requires `f(a) * f(b) <= 0`.
pub fn bisection<F>(f: F, a: f64, b: f64, config: &SolverConfig) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
{
    let mut lo = a;
    let mut hi = b;
    let mut flo = f(lo);
    let fhi = f(hi);

    if flo * fhi > 0.0 {
        return Err(MathError::InvalidBracket {
            a,
            b,
            fa: flo,
            fb: fhi,
        });
    }

    for iteration in 0..config.max_iterations {
        let mid = (lo + hi) / 2.0;
        let fmid = f(mid);

        if fmid.abs() < config.tolerance || (hi - lo).abs() / 2.0 < config.tolerance {
            return Ok(SolverResult {
                root: mid,
                iterations: iteration,
                residual: fmid,
            });
        }

        if flo * fmid < 0.0 {
            hi = mid;
        } else {
            lo = mid;
            flo = fmid;
        }
    }

    Err(MathError::convergence_failed(
        config.max_iterations,
        f((lo + hi) / 2.0).abs(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_finds_sqrt_two() {
        let f = |x: f64| x * x - 2.0;
        let config = SolverConfig::new(1e-10, 100);
        let result = bisection(f, 1.0, 2.0, &config).unwrap();
        assert_relative_eq!(result.root, std::f64::consts::SQRT_2, epsilon = 1e-9);
    }

    #[test]
    fn test_rejects_bad_bracket() {
        let f = |x: f64| x * x + 1.0;
        assert!(bisection(f, -1.0, 1.0, &SolverConfig::default()).is_err());
    }

    #[test]
    fn test_iteration_budget() {
        let f = |x: f64| x;
        let config = SolverConfig::new(0.0, 5);
        assert!(matches!(
            bisection(f, -1.0, 2.0, &config),
            Err(MathError::ConvergenceFailed { iterations: 5, .. })
        ));
    }
}
