//! Grossup: solve for the principal that nets a requested amount after tax.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tracing::debug;

use mutuum_core::time::DateTime;
use mutuum_core::types::{InterestRate, Money};
use mutuum_math::solvers::{brent, SolverConfig};

use crate::error::{LoanError, LoanResult};
use crate::loan::Loan;
use crate::scheduler::Scheduler;
use crate::tax::Tax;

/// Result of a grossup calculation.
///
/// Carries the grossed-up principal, the requested net amount, the tax
/// computed on that principal, and everything needed to build the loan via
/// [`GrossupResult::to_loan`].
#[derive(Debug, Clone)]
pub struct GrossupResult {
    /// The grossed-up principal (cent-aligned: `raw == real`).
    pub principal: Money,
    /// The net amount the borrower receives.
    pub requested_amount: Money,
    /// Total tax computed on the grossed-up principal.
    pub total_tax: Money,
    interest_rate: InterestRate,
    due_dates: Vec<DateTime>,
    disbursement_date: DateTime,
    scheduler: Scheduler,
    taxes: Vec<Arc<dyn Tax>>,
}

impl GrossupResult {
    /// Builds a loan with the grossed-up principal and the same schedule
    /// inputs. Fine, grace, and mora settings can be layered on with the
    /// loan's builder methods afterwards.
    pub fn to_loan(&self) -> LoanResult<Loan> {
        Ok(Loan::new(
            self.principal,
            self.interest_rate.clone(),
            self.due_dates.clone(),
            Some(self.disbursement_date),
        )?
        .with_scheduler(self.scheduler)?
        .with_taxes(self.taxes.clone()))
    }
}

/// Solves `principal − total_tax(principal) = requested_amount`.
///
/// Taxes are computed on the loan principal, so the principal must be
/// grossed up for the borrower to receive the requested net amount. The
/// objective is non-smooth (cent rounding in the schedule and tax gives it
/// a stair-step shape), so the solve is a bracketed Brent run over
/// `[requested, 2 · requested]` with 1e-4 tolerance, followed by a cent
/// snap: of the cent below, at, and above the converged value, the smallest
/// cent-aligned principal whose net still covers the request wins. The
/// borrower may receive up to one cent more than requested, never less.
///
/// # Errors
///
/// - `LoanError::InvalidInput` for a non-positive request or empty taxes
/// - `LoanError::InvalidInput` when the solver fails to converge
pub fn grossup(
    requested_amount: Money,
    interest_rate: &InterestRate,
    due_dates: &[DateTime],
    disbursement_date: DateTime,
    scheduler: Scheduler,
    taxes: &[Arc<dyn Tax>],
) -> LoanResult<GrossupResult> {
    if !requested_amount.is_positive() {
        return Err(LoanError::invalid_input("requested_amount must be positive"));
    }
    if taxes.is_empty() {
        return Err(LoanError::invalid_input(
            "at least one tax is required for grossup",
        ));
    }

    let total_tax = |principal: Money| -> LoanResult<Money> {
        let schedule =
            scheduler.generate(principal, interest_rate, due_dates, disbursement_date)?;
        Ok(taxes
            .iter()
            .map(|tax| tax.calculate(&schedule, disbursement_date).total)
            .sum())
    };

    let requested = requested_amount.raw().to_f64().unwrap_or(0.0);
    let objective = |p: f64| -> f64 {
        let principal = match Money::from_f64(p) {
            Ok(money) => money,
            Err(_) => return f64::MAX,
        };
        match total_tax(principal) {
            Ok(tax) => p - requested - tax.raw().to_f64().unwrap_or(0.0),
            Err(_) => f64::MAX,
        }
    };

    let config = SolverConfig::new(1e-4, 200);
    let solved = brent(&objective, requested, requested * 2.0, &config)
        .map_err(|err| LoanError::invalid_input(format!("grossup solver failed: {err}")))?;

    // Snap to the smallest cent-aligned principal that still nets the request
    let center = Money::from_f64(solved.root)
        .map_err(|err| LoanError::invalid_input(err.to_string()))?
        .to_real_money();
    let mut principal = None;
    for offset in [dec!(-0.01), dec!(0), dec!(0.01), dec!(0.02)] {
        let candidate = Money::new(center.raw() + offset);
        if candidate - total_tax(candidate)? >= requested_amount {
            principal = Some(candidate);
            break;
        }
    }
    let principal = principal.ok_or_else(|| {
        LoanError::invalid_input("grossup cent snap found no admissible principal")
    })?;

    let tax = total_tax(principal)?;
    debug!(
        principal = %principal,
        tax = %tax,
        iterations = solved.iterations,
        "grossup converged"
    );

    Ok(GrossupResult {
        principal,
        requested_amount,
        total_tax: tax,
        interest_rate: interest_rate.clone(),
        due_dates: due_dates.to_vec(),
        disbursement_date,
        scheduler,
        taxes: taxes.to_vec(),
    })
}

/// Computes a grossed-up loan in a single call.
///
/// Sugar for `grossup(...)?.to_loan()`.
pub fn grossup_loan(
    requested_amount: Money,
    interest_rate: &InterestRate,
    due_dates: &[DateTime],
    disbursement_date: DateTime,
    scheduler: Scheduler,
    taxes: &[Arc<dyn Tax>],
) -> LoanResult<Loan> {
    grossup(
        requested_amount,
        interest_rate,
        due_dates,
        disbursement_date,
        scheduler,
        taxes,
    )?
    .to_loan()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::Iof;

    fn dt(y: i32, m: u32, d: u32) -> DateTime {
        DateTime::from_ymd(y, m, d).unwrap()
    }

    fn dues() -> Vec<DateTime> {
        vec![dt(2024, 2, 1), dt(2024, 3, 1), dt(2024, 4, 1)]
    }

    fn standard_taxes() -> Vec<Arc<dyn Tax>> {
        vec![Arc::new(Iof::individual())]
    }

    fn solve(requested: Decimal, scheduler: Scheduler) -> GrossupResult {
        grossup(
            Money::new(requested),
            &InterestRate::parse("2% m").unwrap(),
            &dues(),
            dt(2024, 1, 1),
            scheduler,
            &standard_taxes(),
        )
        .unwrap()
    }

    #[test]
    fn test_principal_exceeds_request() {
        let result = solve(dec!(10000), Scheduler::Price);
        assert!(result.principal > Money::new(dec!(10000)));
        assert_eq!(result.requested_amount, Money::new(dec!(10000)));
        assert!(result.total_tax.is_positive());
    }

    #[test]
    fn test_net_covers_request_within_a_cent() {
        let result = solve(dec!(10000), Scheduler::Price);
        let net = result.principal - result.total_tax;
        assert!(net >= result.requested_amount);
        assert!(net - result.requested_amount <= Money::new(dec!(0.01)));
    }

    #[test]
    fn test_principal_is_cent_aligned() {
        let result = solve(dec!(10000), Scheduler::Price);
        assert_eq!(result.principal.raw(), result.principal.real());
    }

    #[test]
    fn test_one_cent_less_does_not_cover() {
        let result = solve(dec!(10000), Scheduler::Price);
        let below = Money::new(result.principal.raw() - dec!(0.01));

        let schedule = Scheduler::Price
            .generate(
                below,
                &InterestRate::parse("2% m").unwrap(),
                &dues(),
                dt(2024, 1, 1),
            )
            .unwrap();
        let tax = Iof::individual().calculate(&schedule, dt(2024, 1, 1)).total;
        assert!(below - tax < result.requested_amount);
    }

    #[test]
    fn test_works_with_sac_scheduler() {
        let result = solve(dec!(10000), Scheduler::InvertedPrice);
        let net = result.principal - result.total_tax;
        assert!(net >= Money::new(dec!(10000)));
        assert!(net - Money::new(dec!(10000)) <= Money::new(dec!(0.01)));
    }

    #[test]
    fn test_small_and_large_amounts() {
        for amount in [dec!(100), dec!(1000000)] {
            let result = solve(amount, Scheduler::Price);
            let net = result.principal - result.total_tax;
            assert!(net >= Money::new(amount));
            assert!(net - Money::new(amount) <= Money::new(dec!(0.01)));
        }
    }

    #[test]
    fn test_rejects_zero_request() {
        let err = grossup(
            Money::zero(),
            &InterestRate::parse("2% m").unwrap(),
            &dues(),
            dt(2024, 1, 1),
            Scheduler::Price,
            &standard_taxes(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_rejects_empty_taxes() {
        let err = grossup(
            Money::new(dec!(10000)),
            &InterestRate::parse("2% m").unwrap(),
            &dues(),
            dt(2024, 1, 1),
            Scheduler::Price,
            &[],
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_to_loan_carries_principal_and_taxes() {
        let result = solve(dec!(10000), Scheduler::Price);
        let loan = result.to_loan().unwrap();
        assert_eq!(loan.principal(), result.principal);
        assert_eq!(loan.total_tax(), result.total_tax);
        assert!(loan.net_disbursement() >= Money::new(dec!(10000)));
    }
}
