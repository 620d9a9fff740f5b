//! Time handling: the default timezone, tz-aware datetimes, and the shared
//! overridable time context.

mod context;
mod datetime;
mod tz;

pub use context::{TimeContext, TimeSource};
pub use datetime::DateTime;
pub use tz::{default_tz, now, set_default_tz, set_default_tz_offset};
