//! Installment — the derived per-period view of a repayment plan.

use serde::{Deserialize, Serialize};

use mutuum_core::time::DateTime;
use mutuum_core::types::Money;

use crate::loan::settlement::SettlementAllocation;
use crate::schedule::PaymentScheduleEntry;

/// A single installment of a loan's repayment plan.
///
/// Installments are consequences of the loan, not stored state: the loan
/// builds them on demand as a live snapshot, combining the original
/// schedule (what is expected) with the allocations attributed from actual
/// payments (what has been paid).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    /// 1-based position in the plan.
    pub number: u32,
    /// When the installment falls due.
    pub due_date: DateTime,
    /// Days accrued in the period.
    pub days_in_period: i64,
    /// Scheduled total payment.
    pub expected_payment: Money,
    /// Scheduled principal component.
    pub expected_principal: Money,
    /// Scheduled interest component.
    pub expected_interest: Money,
    /// Mora interest owed for this installment.
    pub expected_mora: Money,
    /// Fine owed for this installment.
    pub expected_fine: Money,
    /// Principal actually paid toward this installment.
    pub principal_paid: Money,
    /// Regular interest actually paid toward this installment.
    pub interest_paid: Money,
    /// Mora interest actually paid toward this installment.
    pub mora_paid: Money,
    /// Fines actually paid toward this installment.
    pub fine_paid: Money,
    /// Per-payment allocation detail attributed to this installment.
    pub allocations: Vec<SettlementAllocation>,
}

impl Installment {
    /// Builds an installment from a schedule entry plus attributed
    /// allocations and the fine/mora amounts owed.
    #[must_use]
    pub fn from_schedule_entry(
        entry: &PaymentScheduleEntry,
        allocations: Vec<SettlementAllocation>,
        expected_mora: Money,
        expected_fine: Money,
    ) -> Self {
        let principal_paid = allocations.iter().map(|a| a.principal).sum();
        let interest_paid = allocations.iter().map(|a| a.interest).sum();
        let mora_paid = allocations.iter().map(|a| a.mora).sum();
        let fine_paid = allocations.iter().map(|a| a.fine).sum();

        Self {
            number: entry.payment_number,
            due_date: entry.due_date,
            days_in_period: entry.days_in_period,
            expected_payment: entry.payment_amount,
            expected_principal: entry.principal_payment,
            expected_interest: entry.interest_payment,
            expected_mora,
            expected_fine,
            principal_paid,
            interest_paid,
            mora_paid,
            fine_paid,
            allocations,
        }
    }

    /// The amount still owed to fully settle this installment, clamped at
    /// zero.
    #[must_use]
    pub fn balance(&self) -> Money {
        let expected = self.expected_principal
            + self.expected_interest
            + self.expected_mora
            + self.expected_fine;
        let paid = self.principal_paid + self.interest_paid + self.mora_paid + self.fine_paid;
        let remaining = expected - paid;
        if remaining.is_positive() {
            remaining
        } else {
            Money::zero()
        }
    }

    /// Whether this installment has been fully settled.
    #[must_use]
    pub fn is_fully_paid(&self) -> bool {
        self.balance().is_zero()
    }
}
