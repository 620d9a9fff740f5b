//! # Mutuum Loan
//!
//! The loan state machine and its satellites:
//!
//! - **Schedulers**: [`Scheduler::Price`] (French, constant payment) and
//!   [`Scheduler::InvertedPrice`] (SAC, constant amortization) produce a
//!   [`PaymentSchedule`] from principal, rate, due dates, and disbursement
//! - **Loan**: records payments with strict fine → interest → principal
//!   allocation, splits late interest into regular and mora components,
//!   levies fines, and derives installments, settlements, balances, and
//!   rebuilt amortization schedules on demand
//! - **Warp**: scoped observation of a loan at any date through a deep
//!   clone with an overridden clock
//! - **Taxes**: per-installment taxes ([`tax::Iof`]) and the grossup solver
//!   that finances them into the principal
//!
//! ## Example
//!
//! ```rust,ignore
//! use mutuum_loan::{Loan, Warp};
//!
//! let mut loan = Loan::new(principal, rate, due_dates, Some(disbursement))?;
//! loan.record_payment(amount, payment_date)?;
//!
//! let warped = Warp::enter(&loan, "2030-01-15")?;
//! println!("balance then: {}", warped.current_balance());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

pub mod error;
mod loan;
mod schedule;
mod scheduler;
pub mod tax;
mod warp;

pub use error::{LoanError, LoanResult};
pub use loan::{
    AnticipationResult, Installment, Loan, MoraStrategy, Settlement, SettlementAllocation,
};
pub use schedule::{PaymentSchedule, PaymentScheduleEntry};
pub use scheduler::Scheduler;
pub use tax::{grossup, grossup_loan, GrossupResult, Iof, IofRounding, Tax, TaxResult};
pub use warp::Warp;
