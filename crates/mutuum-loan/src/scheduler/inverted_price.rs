//! Constant amortization (SAC) scheduler.

use rust_decimal::Decimal;

use mutuum_core::time::DateTime;
use mutuum_core::types::{InterestRate, Money};

use crate::schedule::{PaymentSchedule, PaymentScheduleEntry};
use crate::scheduler::{compound_growth, day_offsets};

/// Generates a constant-amortization schedule.
///
/// Every entry pays the same cent-quantized principal slice
/// `principal / n`; interest rides on top of the declining balance, so the
/// total payment falls over time. The last entry pays whatever balance
/// remains, absorbing the quantization residual.
pub(super) fn generate(
    principal: Money,
    rate: &InterestRate,
    due_dates: &[DateTime],
    disbursement_date: DateTime,
) -> PaymentSchedule {
    let daily = rate.to_daily().as_decimal();
    let offsets = day_offsets(due_dates, disbursement_date);
    let fixed_principal = Money::new(principal.raw() / Decimal::from(due_dates.len())).real();

    let mut entries = Vec::with_capacity(due_dates.len());
    let mut balance = principal.raw();
    let mut previous_offset = 0i64;

    for (index, (due_date, offset)) in due_dates.iter().zip(&offsets).enumerate() {
        let days = offset - previous_offset;
        let interest = balance * (compound_growth(daily, days) - Decimal::ONE);

        let is_last = index == due_dates.len() - 1;
        let principal_payment = if is_last { balance } else { fixed_principal };
        let payment_amount = principal_payment + interest;

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::Scheduler;
    use rust_decimal_macros::dec;

    fn dt(y: i32, m: u32, d: u32) -> DateTime {
        DateTime::from_ymd(y, m, d).unwrap()
    }

    fn schedule_for(principal: Decimal, rate: &str, months: u32) -> PaymentSchedule {
        let dues: Vec<DateTime> = (0..months as i32)
            .map(|i| dt(2024, 2, 1).add_months(i))
            .collect();
        Scheduler::InvertedPrice
            .generate(
                Money::new(principal),
                &InterestRate::parse(rate).unwrap(),
                &dues,
                dt(2024, 1, 1),
            )
            .unwrap()
    }

    #[test]
    fn test_principal_constant_except_last() {
        let schedule = schedule_for(dec!(10000), "12% a", 12);
        let first = schedule[0].principal_payment;
        for entry in schedule.entries().iter().take(11) {
            assert_eq!(entry.principal_payment, first);
        }
        assert_eq!(schedule.total_principal(), Money::new(dec!(10000)));
        assert!(schedule[11].ending_balance.is_zero());
    }

    #[test]
    fn test_payments_decrease_over_time() {
        let schedule = schedule_for(dec!(10000), "12% a", 12);
        for pair in schedule.entries().windows(2).take(10) {
            assert!(pair[0].payment_amount > pair[1].payment_amount);
        }
    }

    #[test]
    fn test_interest_rides_on_declining_balance() {
        let schedule = schedule_for(dec!(12000), "10% a", 6);
        for pair in schedule.entries().windows(2) {
            assert_eq!(pair[1].beginning_balance.raw(), pair[0].ending_balance.raw());
        }
        for entry in &schedule {
            assert_eq!(
                entry.payment_amount.raw(),
                entry.principal_payment.raw() + entry.interest_payment.raw()
            );
        }
    }

    #[test]
    fn test_cent_residual_absorbed_by_last_entry() {
        // 10000 / 3 quantizes to 3333.33; the last entry pays 3333.34
        let schedule = schedule_for(dec!(10000), "0% a", 3);
        assert_eq!(schedule[0].principal_payment, Money::new(dec!(3333.33)));
        assert_eq!(schedule[1].principal_payment, Money::new(dec!(3333.33)));
        assert_eq!(schedule[2].principal_payment, Money::new(dec!(3333.34)));
    }

    #[test]
    fn test_single_payment() {
        let schedule = schedule_for(dec!(5000), "6% a", 1);
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].principal_payment, Money::new(dec!(5000)));
        assert!(schedule[0].ending_balance.is_zero());
    }
}
