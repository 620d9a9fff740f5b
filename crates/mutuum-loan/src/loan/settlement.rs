//! Settlement data structures — the result of applying a payment.

use serde::{Deserialize, Serialize};

use mutuum_core::time::DateTime;
use mutuum_core::types::Money;

use crate::loan::installment::Installment;

/// Breakdown of a payment's allocation to a single installment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementAllocation {
    /// 1-based installment number the slice applies to.
    pub installment_number: u32,
    /// Principal attributed to this installment.
    pub principal: Money,
    /// Regular interest attributed to this installment.
    pub interest: Money,
    /// Mora interest attributed to this installment.
    pub mora: Money,
    /// Fine amount attributed to this installment.
    pub fine: Money,
    /// Whether the installment's principal is fully covered after this slice.
    pub is_fully_covered: bool,
}

impl SettlementAllocation {
    /// A principal-only slice; interest, mora, and fine start at zero.
    #[must_use]
    pub fn principal_slice(installment_number: u32, principal: Money, is_fully_covered: bool) -> Self {
        Self {
            installment_number,
            principal,
            interest: Money::zero(),
            mora: Money::zero(),
            fine: Money::zero(),
            is_fully_covered,
        }
    }
}

/// Result of applying a single payment to a loan.
///
/// Captures the full allocation across fines, regular interest, mora
/// interest, and principal, with per-installment detail. Settlements are
/// never stored: they are reconstructed from the loan's cash-flow stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    /// Total amount of the payment.
    pub payment_amount: Money,
    /// When the funds moved.
    pub payment_date: DateTime,
    /// Portion that went to outstanding fines.
    pub fine_paid: Money,
    /// Portion that went to regular interest.
    pub interest_paid: Money,
    /// Portion that went to mora interest.
    pub mora_paid: Money,
    /// Portion that went to principal.
    pub principal_paid: Money,
    /// Principal still outstanding after this payment.
    pub remaining_balance: Money,
    /// Per-installment allocation detail.
    pub allocations: Vec<SettlementAllocation>,
}

/// Result of pricing an installment anticipation.
#[derive(Debug, Clone)]
pub struct AnticipationResult {
    /// Amount to pay now to settle the selected installments.
    pub amount: Money,
    /// The selected installments, as they stand at pricing time.
    pub installments: Vec<Installment>,
}
