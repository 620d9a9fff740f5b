//! Amortization schedulers.
//!
//! Both schedulers take the same inputs — principal, rate, due dates, and
//! disbursement date — and produce a [`PaymentSchedule`] with daily-compound
//! interest per period. Day counts come from the actual calendar gaps
//! between dates, so irregular grids work the same as regular ones.

mod inverted_price;
mod price;

use serde::{Deserialize, Serialize};

use mutuum_core::time::DateTime;
use mutuum_core::types::{InterestRate, Money};

use crate::error::{LoanError, LoanResult};
use crate::schedule::PaymentSchedule;

/// Which amortization system a loan follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Scheduler {
    /// French system: constant total payment, the last entry absorbs the
    /// rounding residual.
    #[default]
    Price,
    /// Constant amortization (SAC): constant principal payment, decreasing
    /// totals.
    InvertedPrice,
}

impl Scheduler {
    /// Generates the amortization schedule.
    ///
    /// # Errors
    ///
    /// Returns `LoanError::InvalidInput` when no due dates are given.
    pub fn generate(
        &self,
        principal: Money,
        rate: &InterestRate,
        due_dates: &[DateTime],
        disbursement_date: DateTime,
    ) -> LoanResult<PaymentSchedule> {
        if due_dates.is_empty() {
            return Err(LoanError::invalid_input("at least one due date is required"));
        }
        match self {
            Scheduler::Price => Ok(price::generate(principal, rate, due_dates, disbursement_date)),
            Scheduler::InvertedPrice => Ok(inverted_price::generate(
                principal,
                rate,
                due_dates,
                disbursement_date,
            )),
        }
    }
}

/// Day offsets from the disbursement to each due date.
fn day_offsets(due_dates: &[DateTime], disbursement_date: DateTime) -> Vec<i64> {
    due_dates
        .iter()
        .map(|due| disbursement_date.days_between(due))
        .collect()
}

/// Daily-compound growth factor `(1 + daily)^days`, identity for
/// non-positive day counts.
pub(crate) fn compound_growth(daily: rust_decimal::Decimal, days: i64) -> rust_decimal::Decimal {
    use rust_decimal::{Decimal, MathematicalOps};
    if days <= 0 {
        Decimal::ONE
    } else {
        (Decimal::ONE + daily).powu(days as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn dt(y: i32, m: u32, d: u32) -> DateTime {
        DateTime::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_due_dates_rejected() {
        let rate = InterestRate::parse("5% a").unwrap();
        let result =
            Scheduler::Price.generate(Money::new(dec!(1000)), &rate, &[], dt(2024, 1, 1));
        assert!(result.is_err());
    }

    #[test]
    fn test_day_offsets() {
        let dues = [dt(2024, 2, 1), dt(2024, 3, 1)];
        assert_eq!(day_offsets(&dues, dt(2024, 1, 1)), vec![31, 60]);
    }

    #[test]
    fn test_both_schedulers_share_inputs() {
        let rate = InterestRate::parse("6% a").unwrap();
        let dues = [dt(2024, 2, 1), dt(2024, 3, 1), dt(2024, 4, 1)];
        let principal = Money::new(dec!(10000));

        for scheduler in [Scheduler::Price, Scheduler::InvertedPrice] {
            let schedule = scheduler
                .generate(principal, &rate, &dues, dt(2024, 1, 1))
                .unwrap();
            assert_eq!(schedule.len(), 3);
            assert_eq!(schedule.total_principal(), principal);
            assert!(schedule[2].ending_balance.is_zero());
        }
    }
}
