//! IOF — the Brazilian tax on credit operations.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use mutuum_core::time::DateTime;
use mutuum_core::types::Money;

use crate::error::{LoanError, LoanResult};
use crate::schedule::PaymentSchedule;
use crate::tax::{Tax, TaxInstallmentDetail, TaxResult};

/// How IOF components are aggregated per installment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum IofRounding {
    /// Sum the high-precision daily and additional components, round once.
    #[default]
    Precise,
    /// Round each component to the cent before summing, matching common
    /// lending platforms.
    PerComponent,
}

/// IOF on loan operations.
///
/// Two components apply to each installment's principal payment:
///
/// - a daily rate per day from disbursement to the due date, capped at
///   `max_daily_days`
/// - a flat additional rate charged once per installment
///
/// # Example
///
/// ```rust
/// use mutuum_loan::Iof;
///
/// let pf = Iof::individual();   // natural-person rates
/// let pj = Iof::corporate();    // legal-entity rates
/// assert!(pf.daily_rate() > pj.daily_rate());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Iof {
    daily_rate: Decimal,
    additional_rate: Decimal,
    max_daily_days: i64,
    rounding: IofRounding,
}

/// Regulatory daily IOF rate for individuals (0.0082% per day).
const INDIVIDUAL_DAILY_RATE: Decimal = dec!(0.000082);
/// Regulatory daily IOF rate for companies (0.0041% per day).
const CORPORATE_DAILY_RATE: Decimal = dec!(0.000041);
/// Flat additional IOF rate (0.38%).
const ADDITIONAL_RATE: Decimal = dec!(0.0038);

impl Iof {
    /// Creates an IOF with explicit decimal rates.
    #[must_use]
    pub fn new(daily_rate: Decimal, additional_rate: Decimal) -> Self {
        Self {
            daily_rate,
            additional_rate,
            max_daily_days: 365,
            rounding: IofRounding::default(),
        }
    }

    /// Creates an IOF from rate strings, accepting a `%` suffix.
    ///
    /// `Iof::parse("0.0082%", "0.38%")` equals
    /// `Iof::new(dec!(0.000082), dec!(0.0038))`.
    ///
    /// # Errors
    ///
    /// Returns `LoanError::InvalidInput` when a rate does not parse.
    pub fn parse(daily_rate: &str, additional_rate: &str) -> LoanResult<Self> {
        Ok(Self::new(
            parse_rate(daily_rate)?,
            parse_rate(additional_rate)?,
        ))
    }

    /// Pre-configured rates for natural-person borrowers.
    #[must_use]
    pub fn individual() -> Self {
        Self::new(INDIVIDUAL_DAILY_RATE, ADDITIONAL_RATE)
    }

    /// Pre-configured rates for legal-entity borrowers.
    #[must_use]
    pub fn corporate() -> Self {
        Self::new(CORPORATE_DAILY_RATE, ADDITIONAL_RATE)
    }

    /// Caps the number of days the daily rate applies to.
    #[must_use]
    pub fn with_max_daily_days(mut self, max_daily_days: i64) -> Self {
        self.max_daily_days = max_daily_days;
        self
    }

    /// Sets the component-aggregation rounding strategy.
    #[must_use]
    pub fn with_rounding(mut self, rounding: IofRounding) -> Self {
        self.rounding = rounding;
        self
    }

    /// The daily rate as a decimal fraction.
    #[must_use]
    pub fn daily_rate(&self) -> Decimal {
        self.daily_rate
    }

    /// The flat additional rate as a decimal fraction.
    #[must_use]
    pub fn additional_rate(&self) -> Decimal {
        self.additional_rate
    }

    /// The day cap for the daily component.
    #[must_use]
    pub fn max_daily_days(&self) -> i64 {
        self.max_daily_days
    }

    /// The rounding strategy.
    #[must_use]
    pub fn rounding(&self) -> IofRounding {
        self.rounding
    }
}

impl Tax for Iof {
    fn name(&self) -> &str {
        "IOF"
    }

    fn calculate(&self, schedule: &PaymentSchedule, disbursement_date: DateTime) -> TaxResult {
        let mut details = Vec::with_capacity(schedule.len());
        let mut total = Money::zero();

        for entry in schedule {
            let days = disbursement_date
                .days_between(&entry.due_date)
                .clamp(0, self.max_daily_days);
            let principal = entry.principal_payment.raw();

            let daily_component = Money::new(principal * self.daily_rate * Decimal::from(days));
            let additional_component = Money::new(principal * self.additional_rate);

            let tax_amount = match self.rounding {
                IofRounding::Precise => (daily_component + additional_component).to_real_money(),
                IofRounding::PerComponent => {
                    daily_component.to_real_money() + additional_component.to_real_money()
                }
            };

            details.push(TaxInstallmentDetail {
                payment_number: entry.payment_number,
                due_date: entry.due_date,
                principal_payment: entry.principal_payment,
                tax_amount,
            });
            total += tax_amount;
        }

        TaxResult {
            total,
            per_installment: details,
        }
    }
}

fn parse_rate(input: &str) -> LoanResult<Decimal> {
    let trimmed = input.trim();
    let (number, percent) = match trimmed.strip_suffix('%') {
        Some(number) => (number, true),
        None => (trimmed, false),
    };
    let value = Decimal::from_str(number)
        .map_err(|_| LoanError::invalid_input(format!("cannot parse rate '{input}'")))?;
    Ok(if percent {
        value / Decimal::ONE_HUNDRED
    } else {
        value
    })
}
