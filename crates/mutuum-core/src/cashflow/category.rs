//! The closed set of cash-flow category tags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Category of a cash-flow entry.
///
/// This is a closed taxonomy: external reports depend on these exact tags,
/// and queries over categories never admit free-form strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Funds released to the borrower (positive, expected flow)
    ExpectedDisbursement,
    /// Tax withheld at disbursement (negative, expected flow)
    ExpectedTax,
    /// Scheduled interest component (negative, expected flow)
    ExpectedInterest,
    /// Scheduled principal component (negative, expected flow)
    ExpectedPrincipal,
    /// Regular interest paid, up to the due date
    ActualInterest,
    /// Interest paid for days beyond the due date
    ActualMoraInterest,
    /// Principal paid
    ActualPrincipal,
    /// Fine paid
    ActualFine,
    /// Fine levied, increasing the amount owed
    FineApplied,
}

impl Category {
    /// The wire tag for this category.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::ExpectedDisbursement => "expected_disbursement",
            Category::ExpectedTax => "expected_tax",
            Category::ExpectedInterest => "expected_interest",
            Category::ExpectedPrincipal => "expected_principal",
            Category::ActualInterest => "actual_interest",
            Category::ActualMoraInterest => "actual_mora_interest",
            Category::ActualPrincipal => "actual_principal",
            Category::ActualFine => "actual_fine",
            Category::FineApplied => "fine_applied",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expected_disbursement" => Ok(Category::ExpectedDisbursement),
            "expected_tax" => Ok(Category::ExpectedTax),
            "expected_interest" => Ok(Category::ExpectedInterest),
            "expected_principal" => Ok(Category::ExpectedPrincipal),
            "actual_interest" => Ok(Category::ActualInterest),
            "actual_mora_interest" => Ok(Category::ActualMoraInterest),
            "actual_principal" => Ok(Category::ActualPrincipal),
            "actual_fine" => Ok(Category::ActualFine),
            "fine_applied" => Ok(Category::FineApplied),
            _ => Err(CoreError::invalid_input(format!(
                "unknown cash-flow category '{s}'"
            ))),
        }
    }
}
