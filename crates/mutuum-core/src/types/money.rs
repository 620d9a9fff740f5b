//! Exact-decimal monetary values.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// A monetary amount with high internal precision.
///
/// Maintains full decimal precision internally for calculations but exposes a
/// "real money" representation rounded half-up to 2 decimal places for
/// display and comparisons. All arithmetic preserves the raw precision and
/// never routes through binary floating point.
///
/// # Example
///
/// ```rust
/// use mutuum_core::types::Money;
/// use rust_decimal_macros::dec;
///
/// let a = Money::new(dec!(10.005));
/// assert_eq!(a.real(), dec!(10.01));
/// assert_eq!(a.cents(), 1001);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Creates a new monetary amount from a decimal.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// The zero amount.
    #[must_use]
    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Creates an amount from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    /// Parses an amount from a decimal string.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidMoney` if the string is not a valid decimal.
    pub fn parse(s: &str) -> CoreResult<Self> {
        Decimal::from_str(s)
            .map(Money)
            .map_err(|_| CoreError::invalid_money(format!("cannot parse '{s}'")))
    }

    /// Creates an amount from a binary float by stringifying it first.
    ///
    /// The float is formatted to a decimal string before conversion so no
    /// binary rounding artifacts leak into the value.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidMoney` if the value is NaN or infinite.
    pub fn from_f64(value: f64) -> CoreResult<Self> {
        if !value.is_finite() {
            return Err(CoreError::invalid_money(format!(
                "non-finite value {value}"
            )));
        }
        Self::parse(&value.to_string())
    }

    /// Returns the high-precision internal amount.
    #[must_use]
    pub fn raw(&self) -> Decimal {
        self.0
    }

    /// Returns the "real money" amount, rounded half-up to 2 decimal places.
    #[must_use]
    pub fn real(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Returns the real amount expressed in cents.
    #[must_use]
    pub fn cents(&self) -> i64 {
        // real() is quantized to 2 dp, so this is exact
        (self.real() * Decimal::ONE_HUNDRED)
            .trunc()
            .to_i64()
            .unwrap_or_default()
    }

    /// Returns a copy quantized to real-money precision.
    #[must_use]
    pub fn to_real_money(&self) -> Self {
        Money(self.real())
    }

    /// Returns the absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Checks whether the amount is positive at real-money precision.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.real() > Decimal::ZERO
    }

    /// Checks whether the amount is negative at real-money precision.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.real() < Decimal::ZERO
    }

    /// Checks whether the amount is zero at real-money precision.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.real() == Decimal::ZERO
    }

    /// Returns the smaller of two amounts.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        if self <= other {
            self
        } else {
            other
        }
    }

    /// Returns the larger of two amounts.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        if self >= other {
            self
        } else {
            other
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl PartialEq for Money {
    /// Amounts compare at real-money precision.
    fn eq(&self, other: &Self) -> bool {
        self.real() == other.real()
    }
}

impl Eq for Money {}

impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Money {
    fn cmp(&self, other: &Self) -> Ordering {
        self.real().cmp(&other.real())
    }
}

impl PartialEq<Decimal> for Money {
    fn eq(&self, other: &Decimal) -> bool {
        self.real() == *other
    }
}

impl PartialOrd<Decimal> for Money {
    fn partial_cmp(&self, other: &Decimal) -> Option<Ordering> {
        self.real().partial_cmp(other)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    /// Scales by a decimal factor, keeping full precision.
    fn mul(self, factor: Decimal) -> Self::Output {
        Money(self.0 * factor)
    }
}

impl Div<Decimal> for Money {
    type Output = Self;

    /// Divides by a decimal factor, keeping full precision.
    fn div(self, divisor: Decimal) -> Self::Output {
        Money(self.0 / divisor)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl From<i64> for Money {
    fn from(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }
}

impl FromStr for Money {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl fmt::Display for Money {
    /// Renders the real amount with thousands grouping, e.g. `12,345.67`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let real = self.real();
        let negative = real.is_sign_negative() && real != Decimal::ZERO;
        let abs = real.abs();
        let whole = abs.trunc();
        let frac = (abs.fract() * Decimal::ONE_HUNDRED)
            .trunc()
            .to_i64()
            .unwrap_or(0);

        let digits = whole.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let sign = if negative { "-" } else { "" };
        write!(f, "{sign}{grouped}.{frac:02}")
    }
}
