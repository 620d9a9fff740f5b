//! Process-global default timezone.
//!
//! UTC is the default. Timezone-database lookup is out of scope: callers
//! provide a fixed UTC offset, either directly or as a `±HH:MM` identifier.

use chrono::{FixedOffset, Utc};
use std::sync::atomic::{AtomicI32, Ordering};

use crate::error::{CoreError, CoreResult};
use crate::time::DateTime;

/// Default timezone offset east of UTC, in seconds.
static DEFAULT_TZ_SECONDS: AtomicI32 = AtomicI32::new(0);

/// Returns the current default timezone offset.
#[must_use]
pub fn default_tz() -> FixedOffset {
    FixedOffset::east_opt(DEFAULT_TZ_SECONDS.load(Ordering::Relaxed))
        .expect("stored offset is always valid")
}

/// Sets the default timezone from a fixed UTC offset.
pub fn set_default_tz_offset(offset: FixedOffset) {
    DEFAULT_TZ_SECONDS.store(offset.local_minus_utc(), Ordering::Relaxed);
}

/// Sets the default timezone from an identifier.
///
/// Accepts `"UTC"` or a fixed offset of the form `±HH:MM` (e.g. `"-03:00"`).
///
/// # Errors
///
/// Returns `CoreError::InvalidInput` for unrecognized identifiers.
pub fn set_default_tz(identifier: &str) -> CoreResult<()> {
    let offset = parse_offset(identifier)
        .ok_or_else(|| CoreError::invalid_input(format!("unknown timezone '{identifier}'")))?;
    set_default_tz_offset(offset);
    Ok(())
}

fn parse_offset(identifier: &str) -> Option<FixedOffset> {
    let trimmed = identifier.trim();
    if trimmed.eq_ignore_ascii_case("utc") || trimmed == "Z" {
        return FixedOffset::east_opt(0);
    }
    let (sign, rest) = if let Some(rest) = trimmed.strip_prefix('+') {
        (1i32, rest)
    } else if let Some(rest) = trimmed.strip_prefix('-') {
        (-1i32, rest)
    } else {
        return None;
    };
    let (hours, minutes) = rest.split_once(':')?;
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Returns the current wall-clock time in the default timezone.
#[must_use]
pub fn now() -> DateTime {
    DateTime::from(Utc::now().with_timezone(&default_tz()))
}
