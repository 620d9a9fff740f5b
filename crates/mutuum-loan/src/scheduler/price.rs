//! French (constant payment) scheduler.

use rust_decimal::Decimal;

use mutuum_core::time::DateTime;
use mutuum_core::types::{InterestRate, Money};

use crate::schedule::{PaymentSchedule, PaymentScheduleEntry};
use crate::scheduler::{compound_growth, day_offsets};

/// Generates a constant-payment schedule.
///
/// The payment solves the daily-compound present-value identity
/// `PMT · Σ (1 + r)^(−d_k) = principal` over the actual day offsets, then
/// is quantized to the cent. Every entry pays that amount except the last,
/// which settles the remaining balance plus its period interest so the
/// ending balance lands exactly on zero.
pub(super) fn generate(
    principal: Money,
    rate: &InterestRate,
    due_dates: &[DateTime],
    disbursement_date: DateTime,
) -> PaymentSchedule {
    let daily = rate.to_daily().as_decimal();
    let offsets = day_offsets(due_dates, disbursement_date);
    let payment = fixed_payment(principal, daily, &offsets);

    let mut entries = Vec::with_capacity(due_dates.len());
    let mut balance = principal.raw();
    let mut previous_offset = 0i64;

    for (index, (due_date, offset)) in due_dates.iter().zip(&offsets).enumerate() {
        let days = offset - previous_offset;
        let interest = balance * (compound_growth(daily, days) - Decimal::ONE);

        let is_last = index == due_dates.len() - 1;
        let (payment_amount, principal_payment) = if is_last {
            (balance + interest, balance)
        } else {
            (payment, payment - interest)
        };

        let ending = balance - principal_payment;
        entries.push(PaymentScheduleEntry {
            payment_number: index as u32 + 1,
            due_date: *due_date,
            days_in_period: days,
            beginning_balance: Money::new(balance),
            payment_amount: Money::new(payment_amount),
            principal_payment: Money::new(principal_payment),
            interest_payment: Money::new(interest),
            ending_balance: Money::new(ending),
        });

        balance = ending;
        previous_offset = *offset;
    }

    PaymentSchedule::new(entries)
}

/// The cent-quantized constant payment.
fn fixed_payment(principal: Money, daily: Decimal, offsets: &[i64]) -> Decimal {
    let raw = if daily.is_zero() {
        principal.raw() / Decimal::from(offsets.len())
    } else {
        let annuity: Decimal = offsets
            .iter()
            .map(|&d| Decimal::ONE / compound_growth(daily, d))
            .sum();
        principal.raw() / annuity
    };
    Money::new(raw).real()
}
