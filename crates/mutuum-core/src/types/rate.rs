//! Interest rates with compounding frequency and day-count conventions.
//!
//! All conversions pass through the effective annual rate, which is the
//! canonical intermediate form. An optional precision quantizes that hub
//! value, reproducing the truncated rates published by external lenders.

use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};
use crate::types::Money;

/// Compounding frequency of a rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    /// Daily compounding (`year_size` periods per year)
    Daily,
    /// Monthly compounding (12 per year)
    Monthly,
    /// Quarterly compounding (4 per year)
    Quarterly,
    /// Semi-annual compounding (2 per year)
    SemiAnnual,
    /// Annual compounding
    Annual,
    /// Continuous compounding
    Continuous,
}

impl Frequency {
    /// Number of compounding periods per year, or `None` for continuous.
    ///
    /// Daily compounding derives its period count from the year size.
    #[must_use]
    pub fn periods_per_year(&self, year_size: YearSize) -> Option<u32> {
        match self {
            Frequency::Daily => Some(year_size.days()),
            Frequency::Monthly => Some(12),
            Frequency::Quarterly => Some(4),
            Frequency::SemiAnnual => Some(2),
            Frequency::Annual => Some(1),
            Frequency::Continuous => None,
        }
    }

    fn long_name(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::SemiAnnual => "semi_annual",
            Frequency::Annual => "annual",
            Frequency::Continuous => "continuous",
        }
    }

    fn abbreviated_name(self) -> &'static str {
        match self {
            Frequency::Daily => "a.d.",
            Frequency::Monthly => "a.m.",
            Frequency::Quarterly => "a.t.",
            Frequency::SemiAnnual => "a.s.",
            Frequency::Annual => "a.a.",
            Frequency::Continuous => "continuous",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.long_name())
    }
}

/// Day-count convention for the number of days in a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum YearSize {
    /// Commercial year of 365 days
    #[default]
    Commercial,
    /// Banker's year of 360 days
    Banker,
}

impl YearSize {
    /// Number of days in the year under this convention.
    #[must_use]
    pub fn days(&self) -> u32 {
        match self {
            YearSize::Commercial => 365,
            YearSize::Banker => 360,
        }
    }
}

impl fmt::Display for YearSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearSize::Commercial => write!(f, "commercial/365"),
            YearSize::Banker => write!(f, "banker/360"),
        }
    }
}

/// How a rate renders itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RateStyle {
    /// Full period names: `5.250% annual`
    #[default]
    Long,
    /// Abbreviated period tokens: `5.250% a.a.`
    Abbreviated,
}

/// An interest rate with explicit compounding frequency.
///
/// The rate value is the *periodic* rate as a decimal fraction (0.05 = 5%
/// per period). Conversions between frequencies pass through the effective
/// annual rate; daily conversions use the configured [`YearSize`] as the
/// exponent.
///
/// # Example
///
/// ```rust
/// use mutuum_core::types::{Frequency, InterestRate};
/// use rust_decimal_macros::dec;
///
/// let rate = InterestRate::parse("6% a").unwrap();
/// assert_eq!(rate.as_decimal(), dec!(0.06));
/// assert_eq!(rate.frequency(), Frequency::Annual);
///
/// let daily = rate.to_daily();
/// assert_eq!(daily.frequency(), Frequency::Daily);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestRate {
    rate: Decimal,
    frequency: Frequency,
    year_size: YearSize,
    precision: Option<u32>,
    style: RateStyle,
}

/// Tolerance for effective-annual equality comparisons.
const EQ_TOLERANCE: Decimal = dec!(0.0000001);

impl InterestRate {
    /// Creates a rate from a decimal fraction (0.05 = 5% per period).
    #[must_use]
    pub fn new(rate: Decimal, frequency: Frequency) -> Self {
        Self {
            rate,
            frequency,
            year_size: YearSize::default(),
            precision: None,
            style: RateStyle::default(),
        }
    }

    /// Creates a rate from a percentage value (5.0 = 5% per period).
    #[must_use]
    pub fn from_percentage(percentage: Decimal, frequency: Frequency) -> Self {
        Self::new(percentage / Decimal::ONE_HUNDRED, frequency)
    }

    /// Sets the day-count year size.
    #[must_use]
    pub fn with_year_size(mut self, year_size: YearSize) -> Self {
        self.year_size = year_size;
        self
    }

    /// Sets the number of decimal places the effective-annual hub is
    /// truncated to, reproducing externally published rates.
    #[must_use]
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Sets the display style.
    #[must_use]
    pub fn with_style(mut self, style: RateStyle) -> Self {
        self.style = style;
        self
    }

    /// Parses a rate string of the form `<value>[%] <period>`.
    ///
    /// The period accepts long and short forms (`a`, `annual`, `m`,
    /// `monthly`, `d`, `daily`, `q`, `quarterly`, `s`, `semi_annual`) plus
    /// the abbreviated tokens `a.a.`, `a.m.`, `a.d.`, `a.t.`, `a.s.`, which
    /// switch the display style to abbreviated. A `%` suffix on the value
    /// means percentage; without it the value is a decimal fraction.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidRate` on any malformed input.
    pub fn parse(input: &str) -> CoreResult<Self> {
        let normalized = input.trim().to_lowercase();
        let mut parts = normalized.split_whitespace();
        let (value_token, period_token) = match (parts.next(), parts.next(), parts.next()) {
            (Some(value), Some(period), None) => (value, period),
            _ => return Err(CoreError::invalid_rate(input)),
        };

        let (number, is_percentage) = match value_token.strip_suffix('%') {
            Some(number) => (number, true),
            None => (value_token, false),
        };
        if number.is_empty() || number.contains('%') || number.starts_with('-') {
            return Err(CoreError::invalid_rate(input));
        }
        let value =
            Decimal::from_str(number).map_err(|_| CoreError::invalid_rate(input))?;

        let (frequency, style) = match period_token {
            "a" | "annual" => (Frequency::Annual, RateStyle::Long),
            "m" | "monthly" => (Frequency::Monthly, RateStyle::Long),
            "d" | "daily" => (Frequency::Daily, RateStyle::Long),
            "q" | "quarterly" => (Frequency::Quarterly, RateStyle::Long),
            "s" | "semi_annual" | "semi-annual" => (Frequency::SemiAnnual, RateStyle::Long),
            "a.a." => (Frequency::Annual, RateStyle::Abbreviated),
            "a.m." => (Frequency::Monthly, RateStyle::Abbreviated),
            "a.d." => (Frequency::Daily, RateStyle::Abbreviated),
            "a.t." => (Frequency::Quarterly, RateStyle::Abbreviated),
            "a.s." => (Frequency::SemiAnnual, RateStyle::Abbreviated),
            _ => return Err(CoreError::invalid_rate(input)),
        };

        let rate = if is_percentage {
            value / Decimal::ONE_HUNDRED
        } else {
            value
        };

        Ok(Self {
            rate,
            frequency,
            year_size: YearSize::default(),
            precision: None,
            style,
        })
    }

    /// The periodic rate as a decimal fraction.
    #[must_use]
    pub fn as_decimal(&self) -> Decimal {
        self.rate
    }

    /// The periodic rate as a percentage.
    #[must_use]
    pub fn as_percentage(&self) -> Decimal {
        self.rate * Decimal::ONE_HUNDRED
    }

    /// The compounding frequency.
    #[must_use]
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// The day-count year size.
    #[must_use]
    pub fn year_size(&self) -> YearSize {
        self.year_size
    }

    /// The configured effective-annual precision, if any.
    #[must_use]
    pub fn precision(&self) -> Option<u32> {
        self.precision
    }

    /// The display style.
    #[must_use]
    pub fn style(&self) -> RateStyle {
        self.style
    }

    /// The effective annual rate — the canonical conversion hub.
    ///
    /// When a precision is configured the result is truncated to that many
    /// decimal places, matching how external lenders publish rates.
    #[must_use]
    pub fn effective_annual(&self) -> Decimal {
        let effective = match self.frequency {
            Frequency::Annual => self.rate,
            Frequency::Continuous => self.rate.exp() - Decimal::ONE,
            _ => {
                let periods = self
                    .frequency
                    .periods_per_year(self.year_size)
                    .expect("periodic frequency has a period count");
                (Decimal::ONE + self.rate).powu(u64::from(periods)) - Decimal::ONE
            }
        };
        match self.precision {
            Some(places) => {
                effective.round_dp_with_strategy(places, RoundingStrategy::ToZero)
            }
            None => effective,
        }
    }

    /// The equivalent per-period rate for an arbitrary period count.
    #[must_use]
    pub fn periodic_rate(&self, periods_per_year: u32) -> Decimal {
        if self.frequency.periods_per_year(self.year_size) == Some(periods_per_year) {
            return self.rate;
        }
        let exponent = Decimal::ONE / Decimal::from(periods_per_year);
        (Decimal::ONE + self.effective_annual()).powd(exponent) - Decimal::ONE
    }

    fn converted(&self, frequency: Frequency) -> Self {
        if self.frequency == frequency {
            return self.clone();
        }
        let periods = frequency
            .periods_per_year(self.year_size)
            .expect("conversion targets are periodic");
        Self {
            rate: self.periodic_rate(periods),
            frequency,
            year_size: self.year_size,
            precision: self.precision,
            style: self.style,
        }
    }

    /// Converts to a daily rate; the year size drives the exponent.
    #[must_use]
    pub fn to_daily(&self) -> Self {
        self.converted(Frequency::Daily)
    }

    /// Converts to a monthly rate.
    #[must_use]
    pub fn to_monthly(&self) -> Self {
        self.converted(Frequency::Monthly)
    }

    /// Converts to a quarterly rate.
    #[must_use]
    pub fn to_quarterly(&self) -> Self {
        self.converted(Frequency::Quarterly)
    }

    /// Converts to an effective annual rate.
    #[must_use]
    pub fn to_annual(&self) -> Self {
        if self.frequency == Frequency::Annual {
            return self.clone();
        }
        Self {
            rate: self.effective_annual(),
            frequency: Frequency::Annual,
            year_size: self.year_size,
            precision: self.precision,
            style: self.style,
        }
    }

    /// Compounds a principal at the daily rate over a number of days.
    ///
    /// `accrue(P, d) = P · (1 + daily)^d`; non-positive day counts leave the
    /// principal unchanged.
    #[must_use]
    pub fn accrue(&self, principal: &Money, days: i64) -> Money {
        if days <= 0 {
            return *principal;
        }
        let daily = self.to_daily().as_decimal();
        let factor = (Decimal::ONE + daily).powu(days as u64);
        *principal * factor
    }
}

impl PartialEq for InterestRate {
    /// Rates compare by effective annual value, within 1e-7.
    fn eq(&self, other: &Self) -> bool {
        (self.effective_annual() - other.effective_annual()).abs() < EQ_TOLERANCE
    }
}

impl PartialOrd for InterestRate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        self.effective_annual().partial_cmp(&other.effective_annual())
    }
}

impl FromStr for InterestRate {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InterestRate::parse(s)
    }
}

impl fmt::Display for InterestRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.style {
            RateStyle::Long => self.frequency.long_name(),
            RateStyle::Abbreviated => self.frequency.abbreviated_name(),
        };
        write!(f, "{:.3}% {name}", self.as_percentage())
    }
}
