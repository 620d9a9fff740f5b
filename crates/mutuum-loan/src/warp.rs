//! Time-warped observation of a loan.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

use mutuum_core::time::DateTime;

use crate::error::{LoanError, LoanResult};
use crate::loan::Loan;

/// Single process-wide warp slot. Set-and-check is atomic so two threads
/// cannot both enter; released on drop, panic or not.
static WARP_ACTIVE: AtomicBool = AtomicBool::new(false);

/// A loan observed at a fixed point in time.
///
/// Entering a warp deep-clones the loan, overrides the clone's clock with
/// the target date, and pre-applies any late fines up to that date. The
/// guard dereferences to the warped [`Loan`]; every derived view on it —
/// balances, installments, settlements, schedules — answers as of the
/// warped instant. The original loan is never touched, and whatever is done
/// to the clone is discarded when the guard drops.
///
/// Only one warp can be active per process; a nested attempt fails with
/// [`LoanError::NestedWarp`].
///
/// # Example
///
/// ```rust,ignore
/// let warp = Warp::enter(&loan, "2030-01-15")?;
/// println!("balance then: {}", warp.current_balance());
/// drop(warp); // slot released, clone discarded
/// ```
#[derive(Debug)]
pub struct Warp {
    loan: Loan,
    target: DateTime,
}

impl Warp {
    /// Enters a warp at the target date.
    ///
    /// The target accepts anything coercible to a [`DateTime`]: an existing
    /// value, or a string in RFC 3339, naive datetime, or date-only form
    /// (date-only targets land on the start of day in the default
    /// timezone).
    ///
    /// # Errors
    ///
    /// - [`LoanError::NestedWarp`] when a warp is already active
    /// - [`LoanError::InvalidDate`] when the target cannot be parsed
    pub fn enter<T>(loan: &Loan, target: T) -> LoanResult<Self>
    where
        T: TryInto<DateTime>,
        T::Error: Into<LoanError>,
    {
        let target = target.try_into().map_err(Into::into)?;

        if WARP_ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(LoanError::NestedWarp);
        }

        debug!(%target, "entering warp");
        let mut warped = loan.deep_clone();
        warped.time_context().override_source(target);
        warped.calculate_late_fines(target);

        Ok(Self {
            loan: warped,
            target,
        })
    }

    /// The warped instant.
    #[must_use]
    pub fn target(&self) -> DateTime {
        self.target
    }

    /// The warped loan.
    #[must_use]
    pub fn loan(&self) -> &Loan {
        &self.loan
    }

    /// Mutable access to the warped loan. Changes die with the warp.
    pub fn loan_mut(&mut self) -> &mut Loan {
        &mut self.loan
    }
}

impl Deref for Warp {
    type Target = Loan;

    fn deref(&self) -> &Self::Target {
        &self.loan
    }
}

impl DerefMut for Warp {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.loan
    }
}

impl Drop for Warp {
    fn drop(&mut self) {
        debug!(target = %self.target, "leaving warp");
        WARP_ACTIVE.store(false, Ordering::Release);
    }
}
