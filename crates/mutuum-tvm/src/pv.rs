//! Present value calculations.

use rust_decimal::{Decimal, MathematicalOps};

use mutuum_core::cashflow::CashFlow;
use mutuum_core::time::DateTime;
use mutuum_core::types::{InterestRate, Money};

use crate::error::{TvmError, TvmResult};

/// Timing of annuity payments within each period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaymentTiming {
    /// Ordinary annuity: payments at the end of each period.
    #[default]
    End,
    /// Annuity due: payments at the beginning of each period.
    Begin,
}

/// Present value of a cash-flow stream.
///
/// Each entry is discounted back to the valuation date at the daily rate:
/// `PV = Σ CF_k / (1 + daily)^days_k`. The day count is clamped at zero, so
/// flows dated before the valuation date contribute at face value (treated
/// as same-day). The valuation date defaults to the earliest flow date.
#[must_use]
pub fn present_value(
    flow: &CashFlow,
    discount_rate: &InterestRate,
    valuation_date: Option<DateTime>,
) -> Money {
    let entries = flow.entries();
    let Some(valuation) = valuation_date.or_else(|| flow.earliest_datetime()) else {
        return Money::zero();
    };

    let daily = discount_rate.to_daily().as_decimal();
    let mut total = Decimal::ZERO;

    for entry in &entries {
        let days = valuation.days_between(&entry.datetime()).max(0);
        if days == 0 || daily.is_zero() {
            total += entry.amount().raw();
        } else {
            let factor = (Decimal::ONE + daily).powu(days as u64);
            total += entry.amount().raw() / factor;
        }
    }

    Money::new(total)
}

/// Net present value — the same discounting as [`present_value`].
#[must_use]
pub fn npv(
    flow: &CashFlow,
    discount_rate: &InterestRate,
    valuation_date: Option<DateTime>,
) -> Money {
    present_value(flow, discount_rate, valuation_date)
}

/// Present value of a level-payment annuity.
///
/// Ordinary annuity: `PV = PMT · (1 − (1 + r)^(−n)) / r`; an annuity due is
/// the same scaled by `(1 + r)`. A zero periodic rate collapses to
/// `PMT · n`.
#[must_use]
pub fn present_value_of_annuity(
    payment: Money,
    rate: &InterestRate,
    periods: u32,
    timing: PaymentTiming,
) -> Money {
    if periods == 0 || payment.is_zero() {
        return Money::zero();
    }

    let periodic = rate.as_decimal();
    if periodic.is_zero() {
        return payment * Decimal::from(periods);
    }

    let growth = (Decimal::ONE + periodic).powu(u64::from(periods));
    let pv_factor = (Decimal::ONE - Decimal::ONE / growth) / periodic;
    let pv = payment * pv_factor;

    match timing {
        PaymentTiming::End => pv,
        PaymentTiming::Begin => pv * (Decimal::ONE + periodic),
    }
}

/// Present value of a perpetuity: `PV = PMT / r`.
///
/// # Errors
///
/// Returns `TvmError::InvalidInput` when the periodic rate is not positive.
pub fn present_value_of_perpetuity(payment: Money, rate: &InterestRate) -> TvmResult<Money> {
    let periodic = rate.as_decimal();
    if periodic <= Decimal::ZERO {
        return Err(TvmError::invalid_input(
            "perpetuity requires a positive interest rate",
        ));
    }
    Ok(payment / periodic)
}

/// Discount factor `1 / (1 + r)^n` for a possibly fractional period count.
#[must_use]
pub fn discount_factor(rate: &InterestRate, periods: Decimal) -> Decimal {
    if periods.is_zero() {
        return Decimal::ONE;
    }
    let base = Decimal::ONE + rate.as_decimal();
    Decimal::ONE / base.powd(periods)
}
