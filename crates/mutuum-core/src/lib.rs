//! # Mutuum Core
//!
//! Core types for the Mutuum time-value-of-money engine.
//!
//! This crate provides the foundational building blocks used throughout Mutuum:
//!
//! - **Money**: exact-decimal monetary values with a raw/2-dp dual precision model
//! - **InterestRate**: rates with compounding frequency, day-count year size,
//!   string parsing, and conversions through the effective-annual hub
//! - **Time**: timezone-aware datetimes, the process default timezone, and the
//!   shared overridable [`TimeContext`](time::TimeContext)
//! - **Cash flows**: temporal cash-flow records with per-item timelines and a
//!   chainable query builder
//!
//! ## Design Philosophy
//!
//! - **No binary floats in money math**: every monetary value is a `Decimal`
//! - **Explicit over implicit**: rates always carry their compounding frequency
//! - **Time is injected**: anything time-dependent reads a `TimeContext`
//!
//! ## Example
//!
//! ```rust
//! use mutuum_core::prelude::*;
//! use rust_decimal_macros::dec;
//!
//! let principal = Money::new(dec!(10000));
//! let rate = InterestRate::parse("6% a").unwrap();
//! let accrued = rate.accrue(&principal, 31);
//! assert!(accrued > principal);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod cashflow;
pub mod dategen;
pub mod error;
pub mod time;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::cashflow::{CashFlow, CashFlowEntry, CashFlowItem, CashFlowQuery, Category};
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::time::{DateTime, TimeContext};
    pub use crate::types::{Frequency, InterestRate, Money, RateStyle, YearSize};
}

pub use error::{CoreError, CoreResult};
pub use time::{DateTime, TimeContext};
pub use types::{Frequency, InterestRate, Money, RateStyle, YearSize};
