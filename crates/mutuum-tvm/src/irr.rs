//! Internal rate of return solvers.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, MathematicalOps};
use tracing::{debug, trace};

use mutuum_core::cashflow::CashFlow;
use mutuum_core::types::{Frequency, InterestRate, Money, YearSize};
use mutuum_math::solvers::{brent, secant, SolverConfig};

use crate::error::{TvmError, TvmResult};
use crate::pv::present_value;

/// Candidate rates probed when searching for an NPV sign change.
const BRACKET_CANDIDATES: [f64; 10] = [-0.5, -0.1, 0.01, 0.05, 0.10, 0.15, 0.25, 0.50, 1.0, 2.0];

/// Hard bounds on a plausible IRR: between -99% and 1000% annual.
const RATE_FLOOR: f64 = -0.99;
const RATE_CEILING: f64 = 10.0;

/// Residual NPV (in currency units) accepted as converged.
const NPV_TOLERANCE: f64 = 500.0;

/// Internal rate of return with the commercial (365-day) year.
///
/// Convenience wrapper over [`internal_rate_of_return`].
pub fn irr(flow: &CashFlow, guess: Option<&InterestRate>) -> TvmResult<InterestRate> {
    internal_rate_of_return(flow, guess, YearSize::Commercial)
}

/// Internal rate of return of a cash-flow stream.
///
/// The IRR is the annual discount rate at which the stream's NPV is zero.
/// The solver first scans a fixed candidate grid (plus the caller's guess)
/// for an NPV sign change and runs a bracketed Brent solve on it; when no
/// bracket exists it falls back to an open secant iteration seeded by the
/// guess. Results are validated for plausibility before being returned.
///
/// # Errors
///
/// - `TvmError::EmptyCashFlow` when the stream has no live entries
/// - `TvmError::NoSignChange` when the stream lacks inflows or outflows
/// - `TvmError::NoConvergence` when no validated root is found
pub fn internal_rate_of_return(
    flow: &CashFlow,
    guess: Option<&InterestRate>,
    year_size: YearSize,
) -> TvmResult<InterestRate> {
    let entries = flow.entries();
    if entries.is_empty() {
        return Err(TvmError::EmptyCashFlow);
    }

    let has_positive = entries.iter().any(|entry| entry.is_inflow());
    let has_negative = entries.iter().any(|entry| entry.is_outflow());
    if !(has_positive && has_negative) {
        return Err(TvmError::NoSignChange);
    }

    let valuation = flow
        .earliest_datetime()
        .expect("non-empty flow has an earliest date");
    let snapshot = flow.query().to_flow();

    let objective = |rate: f64| -> f64 {
        // Outside the plausible band the NPV is monotone anyway; steer the
        // solver back with large opposing values
        if rate < RATE_FLOOR {
            return 1e10;
        }
        if rate > RATE_CEILING {
            return -1e10;
        }
        let rate_decimal = Decimal::from_f64(rate).unwrap_or_default().round_dp(12);
        let candidate =
            InterestRate::new(rate_decimal, Frequency::Annual).with_year_size(year_size);
        present_value(&snapshot, &candidate, Some(valuation))
            .raw()
            .to_f64()
            .unwrap_or(f64::MAX)
    };

    let initial_guess = guess
        .map(|rate| rate.effective_annual().to_f64().unwrap_or(0.10))
        .unwrap_or(0.10);

    let root = solve_by_bracketing(&objective, initial_guess)
        .or_else(|| solve_open(&objective, initial_guess));

    let Some(root) = root else {
        return Err(TvmError::no_convergence("no NPV sign change found"));
    };

    let residual = objective(root);
    if residual.abs() > NPV_TOLERANCE {
        return Err(TvmError::no_convergence(format!(
            "final NPV {residual:.2} exceeds tolerance"
        )));
    }
    if !(RATE_FLOOR..=RATE_CEILING).contains(&root) {
        return Err(TvmError::no_convergence(format!(
            "rate {:.4}% is implausible",
            root * 100.0
        )));
    }

    debug!(rate = root, residual, "irr converged");

    let rate_decimal = Decimal::from_f64(root)
        .ok_or_else(|| TvmError::no_convergence("root is not representable"))?
        .round_dp(10);
    Ok(InterestRate::new(rate_decimal, Frequency::Annual).with_year_size(year_size))
}

/// Scans adjacent candidate pairs for a sign change and solves the first
/// bracket found.
fn solve_by_bracketing(objective: &impl Fn(f64) -> f64, guess: f64) -> Option<f64> {
    let mut candidates: Vec<f64> = BRACKET_CANDIDATES.to_vec();
    if guess.is_finite() && !candidates.iter().any(|c| (c - guess).abs() < 1e-12) {
        candidates.push(guess);
        candidates.sort_by(|a, b| a.partial_cmp(b).expect("finite candidates"));
    }

    let values: Vec<(f64, f64)> = candidates
        .iter()
        .map(|&rate| (rate, objective(rate)))
        .filter(|(_, value)| value.is_finite())
        .collect();

    let config = SolverConfig::new(1e-8, 100);
    for window in values.windows(2) {
        let (lo, npv_lo) = window[0];
        let (hi, npv_hi) = window[1];
        if npv_lo * npv_hi < 0.0 {
            trace!(lo, hi, "npv sign change bracketed");
            if let Ok(result) = brent(objective, lo, hi, &config) {
                return Some(result.root);
            }
        }
    }
    None
}

/// Open fallback when no candidate pair brackets the root.
fn solve_open(objective: &impl Fn(f64) -> f64, guess: f64) -> Option<f64> {
    let config = SolverConfig::new(1e-8, 100);
    secant(objective, guess, guess + 0.01, &config)
        .ok()
        .map(|result| result.root)
}

/// Modified internal rate of return.
///
/// Positive flows are compounded forward to the final date at the
/// reinvestment rate; negative flows are discounted back to the first date
/// at the finance rate. `MIRR = (FV⁺ / |PV⁻|)^(1/n) − 1` where `n` is the
/// stream's span in years of the given size.
///
/// # Errors
///
/// - `TvmError::EmptyCashFlow` when the stream has no live entries
/// - `TvmError::NoSignChange` without both inflows and outflows
/// - `TvmError::InvalidInput` when all flows share one date
pub fn modified_internal_rate_of_return(
    flow: &CashFlow,
    finance_rate: &InterestRate,
    reinvestment_rate: &InterestRate,
    year_size: YearSize,
) -> TvmResult<InterestRate> {
    let entries = flow.entries();
    if entries.is_empty() {
        return Err(TvmError::EmptyCashFlow);
    }

    let valuation = flow.earliest_datetime().expect("non-empty flow");
    let horizon = flow.latest_datetime().expect("non-empty flow");
    let days_per_year = Decimal::from(year_size.days());
    let total_years =
        Decimal::from(valuation.days_between(&horizon)) / days_per_year;
    if total_years <= Decimal::ZERO {
        return Err(TvmError::invalid_input(
            "MIRR requires cash flows spanning multiple dates",
        ));
    }

    let finance_annual = finance_rate.effective_annual();
    let reinvest_annual = reinvestment_rate.effective_annual();

    let mut future_positive = Money::zero();
    let mut present_negative = Money::zero();

    for entry in &entries {
        if entry.is_inflow() {
            let years = Decimal::from(entry.datetime().days_between(&horizon)) / days_per_year;
            let factor = (Decimal::ONE + reinvest_annual).powd(years.max(Decimal::ZERO));
            future_positive += entry.amount() * factor;
        } else if entry.is_outflow() {
            let years =
                Decimal::from(valuation.days_between(&entry.datetime())) / days_per_year;
            let factor = (Decimal::ONE + finance_annual).powd(years.max(Decimal::ZERO));
            present_negative += entry.amount() / factor;
        }
    }

    if future_positive.is_zero() || present_negative.is_zero() {
        return Err(TvmError::NoSignChange);
    }

    let ratio = future_positive.raw() / present_negative.raw().abs();
    if ratio <= Decimal::ZERO {
        return Err(TvmError::no_convergence("non-positive MIRR ratio"));
    }

    let mirr = ratio.powd(Decimal::ONE / total_years) - Decimal::ONE;
    Ok(InterestRate::new(mirr.round_dp(10), Frequency::Annual).with_year_size(year_size))
}
