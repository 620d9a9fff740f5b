//! Amortization schedule data structures.

use serde::{Deserialize, Serialize};
use std::fmt;

use mutuum_core::time::DateTime;
use mutuum_core::types::Money;

/// A single payment in an amortization schedule.
///
/// This is the standard shape every scheduler produces and every consumer
/// (loan projection, taxes, reports) reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentScheduleEntry {
    /// 1-based position in the schedule.
    pub payment_number: u32,
    /// When the payment falls due.
    pub due_date: DateTime,
    /// Days accrued in this period (from the previous due date or the
    /// disbursement).
    pub days_in_period: i64,
    /// Outstanding principal at the start of the period.
    pub beginning_balance: Money,
    /// Total payment for the period.
    pub payment_amount: Money,
    /// Principal component of the payment.
    pub principal_payment: Money,
    /// Interest component of the payment.
    pub interest_payment: Money,
    /// Outstanding principal after the payment.
    pub ending_balance: Money,
}

impl fmt::Display for PaymentScheduleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Payment {}: {} (principal {}, interest {}) due {}",
            self.payment_number,
            self.payment_amount,
            self.principal_payment,
            self.interest_payment,
            self.due_date
        )
    }
}

/// Complete payment schedule for a loan, with aggregate totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSchedule {
    entries: Vec<PaymentScheduleEntry>,
    total_payments: Money,
    total_interest: Money,
    total_principal: Money,
}

impl PaymentSchedule {
    /// Creates a schedule and computes its totals.
    #[must_use]
    pub fn new(entries: Vec<PaymentScheduleEntry>) -> Self {
        let total_payments = entries.iter().map(|e| e.payment_amount).sum();
        let total_interest = entries.iter().map(|e| e.interest_payment).sum();
        let total_principal = entries.iter().map(|e| e.principal_payment).sum();
        Self {
            entries,
            total_payments,
            total_interest,
            total_principal,
        }
    }

    /// The schedule entries in payment order.
    #[must_use]
    pub fn entries(&self) -> &[PaymentScheduleEntry] {
        &self.entries
    }

    /// Number of payments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the schedule has no payments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all payments.
    #[must_use]
    pub fn total_payments(&self) -> Money {
        self.total_payments
    }

    /// Sum of all interest components.
    #[must_use]
    pub fn total_interest(&self) -> Money {
        self.total_interest
    }

    /// Sum of all principal components.
    #[must_use]
    pub fn total_principal(&self) -> Money {
        self.total_principal
    }

    /// Entry lookup by due date.
    #[must_use]
    pub fn entry_for_due_date(&self, due_date: DateTime) -> Option<&PaymentScheduleEntry> {
        self.entries.iter().find(|e| e.due_date == due_date)
    }

    /// Returns an iterator over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, PaymentScheduleEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a PaymentSchedule {
    type Item = &'a PaymentScheduleEntry;
    type IntoIter = std::slice::Iter<'a, PaymentScheduleEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl std::ops::Index<usize> for PaymentSchedule {
    type Output = PaymentScheduleEntry;

    fn index(&self, index: usize) -> &Self::Output {
        &self.entries[index]
    }
}

impl fmt::Display for PaymentSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PaymentSchedule({} payments, total {}, interest {})",
            self.entries.len(),
            self.total_payments,
            self.total_interest
        )
    }
}
