//! Payment recording: allocation priority, the three-date model, and
//! settlement reconstruction.

use mutuum_core::prelude::*;
use mutuum_loan::{Loan, LoanError};
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

fn dt(y: i32, m: u32, d: u32) -> DateTime {
    DateTime::from_ymd(y, m, d).unwrap()
}

fn money(s: &str) -> Money {
    Money::parse(s).unwrap()
}

fn rate(s: &str) -> InterestRate {
    InterestRate::parse(s).unwrap()
}

fn simple_loan() -> Loan {
    Loan::new(
        money("10000.00"),
        rate("6% a"),
        vec![dt(2025, 2, 1), dt(2025, 3, 1), dt(2025, 4, 1)],
        Some(dt(2025, 1, 1)),
    )
    .unwrap()
}

/// Daily-compounded interest on 10,000 at 6% annual over `days`.
fn manual_interest(principal: Decimal, days: i64) -> Money {
    let daily = rate("6% a").to_daily().as_decimal();
    Money::new(principal * ((Decimal::ONE + daily).powu(days as u64) - Decimal::ONE))
}

#[test]
fn interest_is_absorbed_before_principal() {
    let mut loan = simple_loan();
    let settlement = loan.record_payment(money("5000"), dt(2025, 2, 1)).unwrap();

    let expected_interest = manual_interest(dec!(10000), 31);
    assert_eq!(settlement.interest_paid, expected_interest);
    assert_eq!(settlement.principal_paid, money("5000") - expected_interest);
    assert_eq!(settlement.fine_paid, Money::zero());
    assert_eq!(settlement.mora_paid, Money::zero());
}

#[test]
fn principal_only_positive_after_interest_fully_covered() {
    let mut loan = simple_loan();
    // Payment smaller than the accrued interest: nothing reaches principal
    let settlement = loan.record_payment(money("20"), dt(2025, 2, 1)).unwrap();

    assert_eq!(settlement.interest_paid, money("20"));
    assert_eq!(settlement.principal_paid, Money::zero());
    assert_eq!(loan.principal_balance(), money("10000"));
}

#[test]
fn interest_date_defaults_to_payment_date() {
    let mut loan = simple_loan();
    let settlement = loan.record_payment(money("5000"), dt(2025, 1, 15)).unwrap();
    assert_eq!(settlement.interest_paid, manual_interest(dec!(10000), 14));
}

#[test]
fn explicit_interest_date_drives_the_accrual_window() {
    let mut loan = simple_loan();
    // Pay on Jan 15 but charge interest through the Feb 1 due date
    let settlement = loan
        .record_payment_detailed(
            money("5000"),
            dt(2025, 1, 15),
            Some(dt(2025, 2, 1)),
            None,
            None,
        )
        .unwrap();
    assert_eq!(settlement.interest_paid, manual_interest(dec!(10000), 31));
    assert_eq!(settlement.payment_date, dt(2025, 1, 15));
}

#[test]
fn accrual_restarts_at_the_last_interest_cutoff() {
    let mut loan = simple_loan();
    let first = loan.record_payment(money("100"), dt(2025, 1, 15)).unwrap();
    assert_eq!(first.interest_paid, manual_interest(dec!(10000), 14));

    // Fourteen more days on the reduced principal, not twenty-eight on the
    // original
    let reduced = money("10000") - first.principal_paid;
    let second = loan.record_payment(money("100"), dt(2025, 1, 29)).unwrap();
    assert_eq!(second.interest_paid, manual_interest(reduced.raw(), 14));
}

#[test]
fn recording_future_dated_payments_does_not_inflate_days() {
    let mut loan = simple_loan();
    // Recorded back to back, both dated in the future: the second payment's
    // window starts at the first payment's interest date
    loan.record_payment(money("3000"), dt(2025, 2, 1)).unwrap();
    let second = loan.record_payment(money("3000"), dt(2025, 2, 1)).unwrap();
    assert_eq!(second.interest_paid, Money::zero());
}

#[test]
fn same_datetime_payments_get_distinct_settlements() {
    let mut loan = Loan::new(
        money("10000.00"),
        rate("6% a"),
        vec![dt(2025, 2, 1), dt(2025, 3, 1)],
        Some(dt(2025, 1, 1)),
    )
    .unwrap();

    let payment_date = dt(2025, 2, 1);
    let s1 = loan.record_payment(money("3000"), payment_date).unwrap();
    let s2 = loan.record_payment(money("3000"), payment_date).unwrap();

    assert_eq!(s1.payment_amount, money("3000"));
    assert_eq!(s2.payment_amount, money("3000"));
    assert!(s1.principal_paid.is_positive());
    assert!(s2.principal_paid.is_positive());
    assert!(s2.remaining_balance < s1.remaining_balance);

    let settlements = loan.settlements();
    assert_eq!(settlements.len(), 2);
    let total: Money = settlements.iter().map(|s| s.payment_amount).sum();
    assert_eq!(total, money("6000"));
}

#[test]
fn settlements_property_matches_returned_settlements() {
    let mut loan = simple_loan();
    let schedule = loan.get_original_schedule().clone();
    let returned = loan
        .record_payment(schedule[0].payment_amount, schedule[0].due_date)
        .unwrap();

    let from_property = &loan.settlements()[0];
    assert_eq!(returned.payment_amount, from_property.payment_amount);
    assert_eq!(returned.principal_paid, from_property.principal_paid);
    assert_eq!(returned.interest_paid, from_property.interest_paid);
}

#[test]
fn settlement_components_sum_to_the_payment() {
    let mut loan = simple_loan();
    let settlement = loan.record_payment(money("5000"), dt(2025, 2, 1)).unwrap();
    let total = settlement.fine_paid
        + settlement.interest_paid
        + settlement.mora_paid
        + settlement.principal_paid;
    assert_eq!(total, settlement.payment_amount);
}

#[test]
fn exact_scheduled_payment_fully_covers_its_installment() {
    let mut loan = simple_loan();
    let schedule = loan.get_original_schedule().clone();
    let settlement = loan
        .record_payment(schedule[0].payment_amount, schedule[0].due_date)
        .unwrap();

    assert_eq!(settlement.allocations.len(), 1);
    let allocation = &settlement.allocations[0];
    assert_eq!(allocation.installment_number, 1);
    assert!(allocation.is_fully_covered);
    assert!(
        (allocation.principal.real() - schedule[0].principal_payment.real()).abs()
            <= dec!(0.02)
    );
}

#[test]
fn partial_payment_leaves_installment_uncovered() {
    let mut loan = simple_loan();
    let settlement = loan.record_payment(money("100"), dt(2025, 2, 1)).unwrap();
    assert_eq!(settlement.allocations.len(), 1);
    assert!(!settlement.allocations[0].is_fully_covered);
}

#[test]
fn large_payment_slices_across_installments() {
    let mut loan = simple_loan();
    let schedule = loan.get_original_schedule().clone();
    let amount = schedule[0].payment_amount + schedule[1].payment_amount;
    let settlement = loan.record_payment(amount, dt(2025, 2, 1)).unwrap();

    assert!(settlement.allocations.len() >= 2);
    assert_eq!(settlement.allocations[0].installment_number, 1);
    assert!(settlement.allocations[0].is_fully_covered);
    assert_eq!(settlement.allocations[1].installment_number, 2);

    assert_eq!(loan.next_unpaid_due_date(), Some(dt(2025, 4, 1)));
}

#[test]
fn second_payment_allocates_to_the_next_installment() {
    let mut loan = simple_loan();
    let schedule = loan.get_original_schedule().clone();
    loan.record_payment(schedule[0].payment_amount, schedule[0].due_date)
        .unwrap();
    let second = loan
        .record_payment(schedule[1].payment_amount, schedule[1].due_date)
        .unwrap();
    assert_eq!(second.allocations[0].installment_number, 2);
}

#[test]
fn coverage_follows_principal_milestones_not_payment_count() {
    let mut loan = simple_loan();
    let schedule = loan.get_original_schedule().clone();

    // Two partial payments that together do not cover installment one
    loan.record_payment(money("1000"), dt(2025, 1, 20)).unwrap();
    assert_eq!(loan.next_unpaid_due_date(), Some(dt(2025, 2, 1)));
    loan.record_payment(money("1000"), dt(2025, 1, 25)).unwrap();
    assert_eq!(loan.next_unpaid_due_date(), Some(dt(2025, 2, 1)));

    // Topping up with the full scheduled payment covers it
    loan.record_payment(schedule[0].payment_amount, dt(2025, 2, 1))
        .unwrap();
    assert_eq!(loan.next_unpaid_due_date(), Some(dt(2025, 3, 1)));
}

#[test]
fn full_repayment_reaches_paid_off_state() {
    let mut loan = simple_loan();
    let schedule = loan.get_original_schedule().clone();
    for entry in schedule.iter() {
        loan.record_payment(entry.payment_amount, entry.due_date).unwrap();
    }

    assert!(loan.principal_balance() <= money("0.02"));
    assert!(loan.next_unpaid_due_date().is_none());
    let installments = loan.installments();
    assert!(installments.iter().all(|i| i.principal_paid.is_positive()));
}

#[test]
fn overpayment_error_reports_the_maximum() {
    let mut loan = simple_loan();
    match loan.record_payment(money("15000"), dt(2025, 2, 1)) {
        Err(LoanError::OverPayment { attempted, maximum }) => {
            assert_eq!(attempted, money("15000"));
            // Principal plus 31 days of interest
            let expected = money("10000") + manual_interest(dec!(10000), 31);
            assert_eq!(maximum, expected);
        }
        other => panic!("expected OverPayment, got {other:?}"),
    }
}

#[test]
fn installment_view_combines_expected_and_paid() {
    let mut loan = simple_loan();
    let schedule = loan.get_original_schedule().clone();

    let installments = loan.installments();
    assert_eq!(installments.len(), 3);
    assert_eq!(
        installments.iter().map(|i| i.number).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert!(installments.iter().all(|i| !i.is_fully_paid()));
    assert!(installments.iter().all(|i| i.allocations.is_empty()));

    loan.record_payment(schedule[0].payment_amount, schedule[0].due_date)
        .unwrap();

    let installments = loan.installments();
    assert!(installments[0].is_fully_paid());
    assert_eq!(installments[0].allocations.len(), 1);
    assert!(!installments[1].is_fully_paid());
    assert!(installments[1].allocations.is_empty());
}

#[test]
fn principal_balance_decreases_with_payments() {
    let mut loan = simple_loan();
    loan.record_payment(money("1000"), dt(2025, 1, 15)).unwrap();
    assert!(loan.principal_balance() < money("10000"));
    assert!(loan.principal_balance().is_positive());
}

#[test]
fn exact_payoff_zeroes_the_principal() {
    let mut loan = Loan::new(
        money("1000.00"),
        rate("5% a"),
        vec![dt(2025, 2, 1)],
        Some(dt(2025, 1, 1)),
    )
    .unwrap();

    let daily = rate("5% a").to_daily().as_decimal();
    let interest =
        Money::new(dec!(1000) * ((Decimal::ONE + daily).powu(14) - Decimal::ONE));
    loan.record_payment(money("1000") + interest, dt(2025, 1, 15))
        .unwrap();

    assert_eq!(loan.principal_balance(), Money::zero());
    assert!(loan.is_paid_off());
}
