//! Taxes on loans and the grossup flow.

use std::sync::Arc;

use mutuum_core::prelude::*;
use mutuum_loan::{grossup, grossup_loan, Iof, Loan, Scheduler, Tax};
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

fn dues() -> Vec<DateTime> {
    vec![dt(2024, 2, 1), dt(2024, 3, 1), dt(2024, 4, 1)]
}

fn taxes() -> Vec<Arc<dyn Tax>> {
    vec![Arc::new(Iof::individual())]
}

fn loan_with_tax() -> Loan {
    Loan::new(money("10000"), rate("2% monthly"), dues(), Some(dt(2024, 1, 1)))
        .unwrap()
        .with_taxes(taxes())
}

#[test]
fn tax_totals_are_cached_from_the_original_schedule() {
    let loan = loan_with_tax();
    assert!(loan.total_tax().is_positive());
    assert_eq!(loan.total_tax(), loan.total_tax());
    assert_eq!(
        loan.net_disbursement() + loan.total_tax(),
        loan.principal()
    );
}

#[test]
fn untaxed_loan_has_zero_tax() {
    let loan =
        Loan::new(money("10000"), rate("2% monthly"), dues(), Some(dt(2024, 1, 1))).unwrap();
    assert_eq!(loan.total_tax(), Money::zero());
    assert_eq!(loan.net_disbursement(), loan.principal());
}

#[test]
fn tax_amounts_are_keyed_by_tax_name() {
    let loan = loan_with_tax();
    let amounts = loan.tax_amounts();
    assert_eq!(amounts.len(), 1);
    assert_eq!(amounts[0].0, "IOF");
    assert_eq!(amounts[0].1.per_installment.len(), 3);
    assert_eq!(amounts[0].1.total, loan.total_tax());
}

#[test]
fn expected_flow_carries_a_separate_tax_entry() {
    let loan = loan_with_tax();
    let flow = loan.generate_expected_cash_flow();

    let tax_entries = flow.query().category(Category::ExpectedTax).all();
    assert_eq!(tax_entries.len(), 1);
    assert_eq!(tax_entries[0].amount(), -loan.total_tax());
    assert_eq!(tax_entries[0].datetime(), loan.disbursement_date());

    // The disbursement entry itself stays at the full principal
    let disbursement = flow
        .query()
        .category(Category::ExpectedDisbursement)
        .first()
        .unwrap();
    assert_eq!(disbursement.amount(), loan.principal());

    // Net of the two equals the net disbursement
    let at_disbursement = flow
        .query()
        .datetime_eq(loan.disbursement_date())
        .sum();
    assert_eq!(at_disbursement, loan.net_disbursement());
}

#[test]
fn untaxed_loan_expected_flow_has_no_tax_entry() {
    let loan =
        Loan::new(money("10000"), rate("2% monthly"), dues(), Some(dt(2024, 1, 1))).unwrap();
    let flow = loan.generate_expected_cash_flow();
    assert_eq!(flow.query().category(Category::ExpectedTax).count(), 0);
}

#[test]
fn grossup_satisfies_the_net_disbursement_contract() {
    // S5: 10,000 requested over 12 monthly installments at 1% monthly
    let monthly_dues: Vec<DateTime> = (0..12).map(|i| dt(2024, 2, 1).add_months(i)).collect();
    let result = grossup(
        money("10000"),
        &rate("1% monthly"),
        &monthly_dues,
        dt(2024, 1, 1),
        Scheduler::Price,
        &taxes(),
    )
    .unwrap();

    assert!(result.principal > money("10000"));
    let net = result.principal - result.total_tax;
    assert!(net >= money("10000"));
    assert!(net <= money("10000.01"));
    assert_eq!(result.principal.raw(), result.principal.real());
}

#[test]
fn grossup_loan_nets_the_requested_amount() {
    let loan = grossup_loan(
        money("10000"),
        &rate("2% monthly"),
        &dues(),
        dt(2024, 1, 1),
        Scheduler::Price,
        &taxes(),
    )
    .unwrap();

    assert!(loan.principal() > money("10000"));
    assert!(loan.net_disbursement() >= money("10000"));
    assert!(loan.net_disbursement() <= money("10000.01"));
}

#[test]
fn grossed_up_loan_flow_nets_the_request_at_disbursement() {
    let loan = grossup_loan(
        money("10000"),
        &rate("2% monthly"),
        &dues(),
        dt(2024, 1, 1),
        Scheduler::Price,
        &taxes(),
    )
    .unwrap();

    let flow = loan.generate_expected_cash_flow();
    let at_disbursement = flow.query().datetime_eq(dt(2024, 1, 1)).sum();
    assert!(at_disbursement >= money("10000"));
    assert!(at_disbursement <= money("10000.01"));
}

#[test]
fn corporate_iof_taxes_less_than_individual() {
    let individual = loan_with_tax();
    let corporate = Loan::new(
        money("10000"),
        rate("2% monthly"),
        dues(),
        Some(dt(2024, 1, 1)),
    )
    .unwrap()
    .with_taxes(vec![Arc::new(Iof::corporate())]);

    assert!(corporate.total_tax() < individual.total_tax());
    assert!(corporate.total_tax().is_positive());
}

#[test]
fn payments_on_a_taxed_loan_are_unaffected_by_the_tax() {
    // Tax shapes the expected flow, not the amortization of the principal
    let mut taxed = loan_with_tax();
    let mut untaxed =
        Loan::new(money("10000"), rate("2% monthly"), dues(), Some(dt(2024, 1, 1))).unwrap();

    let taxed_settlement = taxed.record_payment(money("3000"), dt(2024, 2, 1)).unwrap();
    let untaxed_settlement = untaxed.record_payment(money("3000"), dt(2024, 2, 1)).unwrap();

    assert_eq!(taxed_settlement.interest_paid, untaxed_settlement.interest_paid);
    assert_eq!(taxed_settlement.principal_paid, untaxed_settlement.principal_paid);
}

#[test]
fn iof_details_follow_the_schedule_principal() {
    let loan = loan_with_tax();
    let schedule = loan.get_original_schedule();
    let details = &loan.tax_amounts()[0].1.per_installment;

    for (detail, entry) in details.iter().zip(schedule.iter()) {
        assert_eq!(detail.payment_number, entry.payment_number);
        assert_eq!(detail.due_date, entry.due_date);
        assert_eq!(detail.principal_payment, entry.principal_payment);
        assert!(detail.tax_amount.is_positive());
        // Cent-aligned per installment
        assert_eq!(detail.tax_amount.raw(), detail.tax_amount.real());
    }

    let total: Money = details.iter().map(|d| d.tax_amount).sum();
    assert_eq!(total, loan.total_tax());
}

#[test]
fn grossup_result_decimal_check() {
    // Invariant 14: one cent less no longer covers the request
    let result = grossup(
        money("5000"),
        &rate("1.5% monthly"),
        &dues(),
        dt(2024, 1, 1),
        Scheduler::Price,
        &taxes(),
    )
    .unwrap();

    let below = Money::new(result.principal.raw() - dec!(0.01));
    let schedule = Scheduler::Price
        .generate(below, &rate("1.5% monthly"), &dues(), dt(2024, 1, 1))
        .unwrap();
    let below_tax = Iof::individual().calculate(&schedule, dt(2024, 1, 1)).total;
    assert!(below - below_tax < money("5000"));
}
