//! # Mutuum Math
//!
//! Numerical kernels for the Mutuum TVM engine. The only consumers are the
//! IRR solver and the grossup solver, both of which work on non-smooth
//! objectives (cent-rounded tax functions have a stair-step shape), so the
//! emphasis is on *bracketed* methods that cannot be thrown off by a flat or
//! jumpy derivative:
//!
//! - [`solvers::brent`]: bisection + secant + inverse quadratic interpolation
//! - [`solvers::bisection`]: the simple, always-converging fallback
//! - [`solvers::secant`]: open method used only when no bracket exists

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod error;
pub mod solvers;

pub use error::{MathError, MathResult};
pub use solvers::{bisection, brent, secant, SolverConfig, SolverResult};
