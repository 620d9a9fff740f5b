//! # Mutuum TVM
//!
//! Time-value-of-money primitives over [`mutuum_core`] cash flows:
//!
//! - [`present_value`] / [`npv`]: daily-compounded discounting of a stream
//! - [`present_value_of_annuity`] and [`present_value_of_perpetuity`]
//! - [`internal_rate_of_return`] / [`irr`]: bracketed root finding over the
//!   NPV curve, robust to the irregular date grids loans produce
//! - [`modified_internal_rate_of_return`]: separate finance and
//!   reinvestment rates
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use mutuum_core::prelude::*;
//! use mutuum_tvm::{irr, present_value};
//! use rust_decimal_macros::dec;
//!
//! let ctx = Arc::new(TimeContext::new());
//! let flow = CashFlow::from_entries(
//!     vec![
//!         CashFlowEntry::new(
//!             Money::new(dec!(-1000)),
//!             DateTime::from_ymd(2024, 1, 1).unwrap(),
//!             None,
//!             Category::ExpectedDisbursement,
//!         ),
//!         CashFlowEntry::new(
//!             Money::new(dec!(1100)),
//!             DateTime::from_ymd(2024, 12, 31).unwrap(),
//!             None,
//!             Category::ExpectedPrincipal,
//!         ),
//!     ],
//!     ctx,
//! );
//!
//! let rate = irr(&flow, None).unwrap();
//! let residual = present_value(&flow, &rate, None);
//! assert!(residual.abs() < Money::new(dec!(1)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod error;
mod irr;
mod pv;

pub use error::{TvmError, TvmResult};
pub use irr::{internal_rate_of_return, irr, modified_internal_rate_of_return};
pub use pv::{
    discount_factor, npv, present_value, present_value_of_annuity,
    present_value_of_perpetuity, PaymentTiming,
};
