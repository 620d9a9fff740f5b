//! Per-installment loan taxes and the grossup solver.

mod grossup;
mod iof;

pub use grossup::{grossup, grossup_loan, GrossupResult};
pub use iof::{Iof, IofRounding};

use serde::{Deserialize, Serialize};
use std::fmt;

use mutuum_core::time::DateTime;
use mutuum_core::types::Money;

use crate::schedule::PaymentSchedule;

/// Tax breakdown for a single installment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxInstallmentDetail {
    /// 1-based installment number.
    pub payment_number: u32,
    /// The installment's due date.
    pub due_date: DateTime,
    /// Principal component the tax was computed on.
    pub principal_payment: Money,
    /// Tax levied on this installment.
    pub tax_amount: Money,
}

/// Result of a tax calculation across an entire schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxResult {
    /// Total tax over the whole schedule.
    pub total: Money,
    /// Per-installment breakdown.
    pub per_installment: Vec<TaxInstallmentDetail>,
}

/// A tax computed per installment over an amortization schedule.
///
/// The interface is deliberately small: one calculation that receives the
/// schedule and the disbursement date. Concrete taxes ([`Iof`], or anything
/// a caller implements) differ only in how they price each installment.
pub trait Tax: fmt::Debug + Send + Sync {
    /// A short identifier used to key per-tax results on a loan.
    fn name(&self) -> &str;

    /// Calculates the tax over a schedule.
    fn calculate(&self, schedule: &PaymentSchedule, disbursement_date: DateTime) -> TaxResult;
}
