//! Shared, overridable time source.

use std::sync::RwLock;

use crate::time::datetime::DateTime;
use crate::time::tz;

/// Where a [`TimeContext`] reads time from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSource {
    /// The real wall clock in the default timezone.
    System,
    /// A fixed instant, used for warped observation.
    Fixed(DateTime),
}

/// Shared, overridable time source.
///
/// A loan and every cash-flow item it creates hold the same `TimeContext`
/// through an `Arc`, so a single override is observed by all of them. The
/// default behaviour delegates to the wall clock; `override_source` swaps in
/// a fixed instant (a warp), and `clear` restores the clock.
#[derive(Debug)]
pub struct TimeContext {
    source: RwLock<TimeSource>,
}

impl TimeContext {
    /// Creates a context that follows the wall clock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: RwLock::new(TimeSource::System),
        }
    }

    /// Creates a context pinned to a fixed instant.
    #[must_use]
    pub fn fixed(at: DateTime) -> Self {
        Self {
            source: RwLock::new(TimeSource::Fixed(at)),
        }
    }

    /// The current time as seen by this context.
    #[must_use]
    pub fn now(&self) -> DateTime {
        match *self.source.read().expect("time source lock poisoned") {
            TimeSource::System => tz::now(),
            TimeSource::Fixed(at) => at,
        }
    }

    /// Overrides the source with a fixed instant.
    pub fn override_source(&self, at: DateTime) {
        *self.source.write().expect("time source lock poisoned") = TimeSource::Fixed(at);
    }

    /// Restores the wall-clock source.
    pub fn clear(&self) {
        *self.source.write().expect("time source lock poisoned") = TimeSource::System;
    }

    /// The current source, for cloning into a fresh context.
    #[must_use]
    pub fn snapshot(&self) -> TimeSource {
        *self.source.read().expect("time source lock poisoned")
    }
}

impl Default for TimeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for TimeContext {
    /// Clones into an independent context with the same source.
    fn clone(&self) -> Self {
        Self {
            source: RwLock::new(self.snapshot()),
        }
    }
}
