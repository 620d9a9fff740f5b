//! Amortization schedule rebuild: realized past entries plus a fresh
//! projection over the remaining due dates.

use mutuum_core::prelude::*;
use mutuum_loan::Loan;
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

fn three_due_loan() -> Loan {
    Loan::new(
        money("10000.00"),
        rate("5% a"),
        vec![dt(2025, 2, 1), dt(2025, 3, 1), dt(2025, 4, 1)],
        Some(dt(2025, 1, 1)),
    )
    .unwrap()
}

#[test]
fn without_payments_rebuild_matches_the_original() {
    let loan = three_due_loan();
    let rebuilt = loan.get_amortization_schedule().unwrap();
    let original = loan.get_original_schedule();

    assert_eq!(rebuilt.len(), original.len());
    for (r, o) in rebuilt.iter().zip(original.iter()) {
        assert_eq!(r.payment_amount, o.payment_amount);
        assert_eq!(r.due_date, o.due_date);
    }
}

#[test]
fn first_entry_reflects_the_actual_payment() {
    let mut loan = three_due_loan();
    loan.record_payment(money("3500"), dt(2025, 2, 1)).unwrap();
    let schedule = loan.get_amortization_schedule().unwrap();

    assert_eq!(schedule[0].beginning_balance, money("10000"));
    assert_eq!(schedule[0].payment_amount, money("3500"));
    assert_eq!(
        schedule[0].ending_balance,
        schedule[0].beginning_balance - schedule[0].principal_payment
    );
}

#[test]
fn projection_chains_off_the_realized_entry() {
    let mut loan = three_due_loan();
    loan.record_payment(money("3500"), dt(2025, 2, 1)).unwrap();
    let schedule = loan.get_amortization_schedule().unwrap();

    assert_eq!(schedule[1].beginning_balance, schedule[0].ending_balance);
    assert!(schedule[1].payment_amount.is_positive());
    assert!(schedule[2].payment_amount.is_positive());
    assert!(schedule[2].ending_balance.is_zero());
}

#[test]
fn entry_count_tracks_covered_due_dates() {
    let mut loan = three_due_loan();
    // 3500 covers the first installment (scheduled payment is lower)
    loan.record_payment(money("3500"), dt(2025, 2, 1)).unwrap();
    let schedule = loan.get_amortization_schedule().unwrap();
    // One realized entry plus two projected ones
    assert_eq!(schedule.len(), 3);
}

#[test]
fn partial_payment_keeps_the_due_date_in_the_projection() {
    let mut loan = three_due_loan();
    loan.record_payment(money("1000"), dt(2025, 1, 20)).unwrap();
    let schedule = loan.get_amortization_schedule().unwrap();

    assert_eq!(schedule.len(), 4);
    assert_eq!(schedule[1].due_date, dt(2025, 2, 1));
}

#[test]
fn overpayment_skips_covered_due_dates() {
    let mut loan = three_due_loan();
    let original = loan.get_original_schedule().clone();
    let two_installments = original[0].payment_amount + original[1].payment_amount;

    loan.record_payment(two_installments, dt(2025, 2, 1)).unwrap();
    let schedule = loan.get_amortization_schedule().unwrap();

    assert_eq!(schedule.len(), 2);
    assert_eq!(schedule[1].due_date, dt(2025, 4, 1));
    assert!(schedule[1].ending_balance.is_zero());
}

#[test]
fn payment_numbers_are_sequential_after_rebuild() {
    let mut loan = three_due_loan();
    loan.record_payment(money("3500"), dt(2025, 2, 1)).unwrap();
    let schedule = loan.get_amortization_schedule().unwrap();
    let numbers: Vec<u32> = schedule.iter().map(|e| e.payment_number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
}

#[test]
fn fully_paid_loan_rebuilds_to_actual_entries_only() {
    let mut loan = Loan::new(
        money("1000.00"),
        rate("5% a"),
        vec![dt(2025, 2, 1), dt(2025, 3, 1)],
        Some(dt(2025, 1, 1)),
    )
    .unwrap();

    let schedule = loan.get_original_schedule().clone();
    for entry in schedule.iter() {
        loan.record_payment(entry.payment_amount, entry.due_date).unwrap();
    }

    let rebuilt = loan.get_amortization_schedule().unwrap();
    assert_eq!(rebuilt.len(), 2);
    assert!(rebuilt[1].ending_balance <= money("0.02"));
}

#[test]
fn scheduled_payments_on_due_dates_keep_the_projected_pmt() {
    let mut loan = three_due_loan();
    let original = loan.get_original_schedule().clone();

    loan.record_payment(original[0].payment_amount, dt(2025, 2, 1))
        .unwrap();
    let rebuilt = loan.get_amortization_schedule().unwrap();

    // Paying the scheduled amount on the due date leaves the plan intact
    assert_eq!(rebuilt[1].payment_amount, original[1].payment_amount);
    assert_eq!(rebuilt[2].payment_amount, original[2].payment_amount);
}

#[test]
fn projection_uses_the_last_payment_date_as_reference() {
    let mut loan = three_due_loan();
    let original = loan.get_original_schedule().clone();

    // Early payment of the scheduled amount: less interest accrued, more
    // principal retired, so the projected PMT drops
    loan.record_payment(original[0].payment_amount, dt(2025, 1, 15))
        .unwrap();
    let rebuilt = loan.get_amortization_schedule().unwrap();

    assert_eq!(rebuilt[0].days_in_period, 14);
    assert!(rebuilt[1].payment_amount < original[1].payment_amount);
}

#[test]
fn early_anticipation_rebuild_matches_reference_values() {
    // 10,000 at 5% annual, dues Feb-Apr, paid the scheduled PMT on Jan 15
    // with interest only for the elapsed 14 days
    let mut loan = three_due_loan();
    let original = loan.get_original_schedule().clone();
    assert_eq!(original[0].payment_amount, money("3360.16"));

    loan.record_payment_detailed(
        original[0].payment_amount,
        dt(2025, 1, 15),
        Some(dt(2025, 1, 15)),
        None,
        None,
    )
    .unwrap();

    let rebuilt = loan.get_amortization_schedule().unwrap();
    assert_eq!(rebuilt[0].payment_amount, money("3360.16"));
    assert_eq!(rebuilt[0].interest_payment, money("18.73"));
    assert_eq!(rebuilt[0].principal_payment, money("3341.43"));
    assert_eq!(rebuilt[0].ending_balance, money("6658.57"));

    assert_eq!(rebuilt[1].payment_amount, money("3356.31"));
    assert_eq!(rebuilt[2].payment_amount, money("3356.31"));
}

#[test]
fn rebuild_respects_the_scheduler_kind() {
    use mutuum_loan::Scheduler;

    let mut loan = three_due_loan()
        .with_scheduler(Scheduler::InvertedPrice)
        .unwrap();
    loan.record_payment(money("1000"), dt(2025, 1, 20)).unwrap();

    let rebuilt = loan.get_amortization_schedule().unwrap();
    // SAC projection: equal principal slices except the last
    let projected = &rebuilt.entries()[1..];
    assert_eq!(projected[0].principal_payment, projected[1].principal_payment);
}

#[test]
fn sum_of_principal_still_matches_the_loan() {
    let mut loan = three_due_loan();
    loan.record_payment(money("3500"), dt(2025, 2, 1)).unwrap();
    let rebuilt = loan.get_amortization_schedule().unwrap();

    assert!((rebuilt.total_principal().real() - dec!(10000)).abs() <= dec!(0.02));
}
