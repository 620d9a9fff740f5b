//! Core domain types.

mod money;
mod rate;

pub use money::Money;
pub use rate::{Frequency, InterestRate, RateStyle, YearSize};
