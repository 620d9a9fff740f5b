//! Frozen cash-flow entry records.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cashflow::Category;
use crate::time::DateTime;
use crate::types::Money;

/// Immutable snapshot of a monetary movement at a point in time.
///
/// This is the *data* part of the cash-flow model. Time-awareness and
/// versioning live in [`CashFlowItem`](crate::cashflow::CashFlowItem), which
/// wraps one or more entries in a timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowEntry {
    amount: Money,
    datetime: DateTime,
    description: Option<String>,
    category: Category,
}

impl CashFlowEntry {
    /// Creates a new entry.
    #[must_use]
    pub fn new(
        amount: Money,
        datetime: DateTime,
        description: Option<String>,
        category: Category,
    ) -> Self {
        Self {
            amount,
            datetime,
            description,
            category,
        }
    }

    /// The monetary amount (positive for inflows, negative for outflows).
    #[must_use]
    pub fn amount(&self) -> Money {
        self.amount
    }

    /// When the movement occurs.
    #[must_use]
    pub fn datetime(&self) -> DateTime {
        self.datetime
    }

    /// Free-form description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The category tag.
    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    /// Whether money is coming in.
    #[must_use]
    pub fn is_inflow(&self) -> bool {
        self.amount.is_positive()
    }

    /// Whether money is going out.
    #[must_use]
    pub fn is_outflow(&self) -> bool {
        self.amount.is_negative()
    }

    /// Whether the amount rounds to zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

impl fmt::Display for CashFlowEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {} ({})", self.amount, self.datetime, self.category)?;
        if let Some(description) = &self.description {
            write!(f, " - {description}")?;
        }
        Ok(())
    }
}
