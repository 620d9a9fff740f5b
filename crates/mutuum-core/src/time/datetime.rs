//! Timezone-aware datetime for financial calculations.

use chrono::{Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};
use crate::time::tz::default_tz;

/// A timezone-aware point in time.
///
/// This is a newtype over `chrono::DateTime<FixedOffset>`. Values built from
/// naive or date-only inputs are *attached* to the configured default
/// timezone — the wall-clock fields are kept and the offset is stamped on,
/// never converted.
///
/// # Example
///
/// ```rust
/// use mutuum_core::time::DateTime;
///
/// let due = DateTime::from_ymd(2024, 2, 1).unwrap();
/// let paid = DateTime::parse("2024-02-15").unwrap();
/// assert_eq!(due.days_between(&paid), 14);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateTime(chrono::DateTime<FixedOffset>);

impl DateTime {
    /// Creates a datetime at the start of the given day in the default zone.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` if the date is invalid.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> CoreResult<Self> {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| CoreError::invalid_date(format!("{year}-{month:02}-{day:02}")))?;
        Ok(Self::from_naive(date.and_time(NaiveTime::MIN)))
    }

    /// Creates a datetime with an explicit time of day in the default zone.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` if any component is out of range.
    pub fn from_ymd_hms(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> CoreResult<Self> {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| CoreError::invalid_date(format!("{year}-{month:02}-{day:02}")))?;
        let time = NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(|| {
            CoreError::invalid_date(format!("{hour:02}:{minute:02}:{second:02}"))
        })?;
        Ok(Self::from_naive(date.and_time(time)))
    }

    /// Attaches the default timezone to a naive datetime.
    #[must_use]
    pub fn from_naive(naive: NaiveDateTime) -> Self {
        let tz = default_tz();
        match tz.from_local_datetime(&naive) {
            chrono::LocalResult::Single(dt) | chrono::LocalResult::Ambiguous(dt, _) => {
                DateTime(dt)
            }
            // Fixed offsets never produce gaps, but keep a total function
            chrono::LocalResult::None => DateTime(tz.from_utc_datetime(&naive)),
        }
    }

    /// Parses an RFC 3339 datetime, a naive `YYYY-MM-DDTHH:MM:SS`, or a
    /// date-only `YYYY-MM-DD` (combined with the start of day).
    ///
    /// Naive forms are attached to the default timezone.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` if no format matches.
    pub fn parse(s: &str) -> CoreResult<Self> {
        let trimmed = s.trim();
        if let Ok(aware) = chrono::DateTime::parse_from_rfc3339(trimmed) {
            return Ok(DateTime(aware));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
            return Ok(Self::from_naive(naive));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
            return Ok(Self::from_naive(naive));
        }
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return Ok(Self::from_naive(date.and_time(NaiveTime::MIN)));
        }
        Err(CoreError::invalid_date(format!("cannot parse '{s}'")))
    }

    /// Returns the year component.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Returns the month component (1-12).
    #[must_use]
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Returns the day component (1-31).
    #[must_use]
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Number of whole days from `self` to `other` (negative if `other` is
    /// earlier).
    #[must_use]
    pub fn days_between(&self, other: &DateTime) -> i64 {
        (other.0 - self.0).num_days()
    }

    /// Adds a number of days, keeping the time of day.
    #[must_use]
    pub fn add_days(&self, days: i64) -> Self {
        DateTime(self.0 + chrono::Duration::days(days))
    }

    /// Adds months with the day-of-month anchored.
    ///
    /// If the anchor day does not exist in the target month the date is
    /// clamped to that month's last day (Jan 31 + 1 month = Feb 28/29).
    #[must_use]
    pub fn add_months(&self, months: i32) -> Self {
        let total = self.year() * 12 + self.month() as i32 - 1 + months;
        let year = total.div_euclid(12);
        let month = (total.rem_euclid(12) + 1) as u32;
        let day = self.day().min(days_in_month(year, month));

        let date = NaiveDate::from_ymd_opt(year, month, day)
            .expect("clamped day is always valid");
        let time = NaiveTime::from_hms_opt(self.0.hour(), self.0.minute(), self.0.second())
            .expect("existing time components are valid");
        DateTime(
            self.0
                .timezone()
                .from_local_datetime(&date.and_time(time))
                .single()
                .unwrap_or_else(|| self.0.timezone().from_utc_datetime(&date.and_time(time))),
        )
    }

    /// Returns the earlier of two datetimes.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        if self <= other {
            self
        } else {
            other
        }
    }

    /// Returns the later of two datetimes.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        if self >= other {
            self
        } else {
            other
        }
    }

    /// Returns the underlying chrono value.
    #[must_use]
    pub fn inner(&self) -> chrono::DateTime<FixedOffset> {
        self.0
    }
}

impl From<chrono::DateTime<FixedOffset>> for DateTime {
    fn from(dt: chrono::DateTime<FixedOffset>) -> Self {
        DateTime(dt)
    }
}

impl From<DateTime> for chrono::DateTime<FixedOffset> {
    fn from(dt: DateTime) -> Self {
        dt.0
    }
}

impl FromStr for DateTime {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateTime::parse(s)
    }
}

impl TryFrom<&str> for DateTime {
    type Error = CoreError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        DateTime::parse(s)
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// Days in a month for a given year.
fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0) {
                29
            } else {
                28
            }
        }
        _ => unreachable!("month is always 1-12 here"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ymd() {
        let dt = DateTime::from_ymd(2024, 2, 1).unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 2);
        assert_eq!(dt.day(), 1);
    }

    #[test]
    fn test_invalid_date() {
        assert!(DateTime::from_ymd(2024, 2, 30).is_err());
        assert!(DateTime::from_ymd(2024, 13, 1).is_err());
    }

    #[test]
    fn test_parse_date_only() {
        let dt = DateTime::parse("2024-01-15").unwrap();
        assert_eq!(dt, DateTime::from_ymd(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_parse_naive_datetime() {
        let dt = DateTime::parse("2024-01-15T10:30:00").unwrap();
        assert_eq!(dt.day(), 15);
    }

    #[test]
    fn test_parse_rfc3339() {
        let dt = DateTime::parse("2024-01-15T10:30:00-03:00").unwrap();
        assert_eq!(dt.inner().offset().local_minus_utc(), -10800);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(DateTime::parse("not a date").is_err());
    }

    #[test]
    fn test_days_between() {
        let a = DateTime::from_ymd(2024, 1, 1).unwrap();
        let b = DateTime::from_ymd(2024, 2, 15).unwrap();
        assert_eq!(a.days_between(&b), 45);
        assert_eq!(b.days_between(&a), -45);
    }

    #[test]
    fn test_add_days() {
        let dt = DateTime::from_ymd(2024, 1, 1).unwrap().add_days(31);
        assert_eq!(dt, DateTime::from_ymd(2024, 2, 1).unwrap());
    }

    #[test]
    fn test_add_months_anchored_clamps() {
        let dt = DateTime::from_ymd(2024, 1, 31).unwrap();
        let feb = dt.add_months(1);
        assert_eq!((feb.month(), feb.day()), (2, 29)); // leap year

        let jan_2025 = dt.add_months(12);
        assert_eq!((jan_2025.year(), jan_2025.day()), (2025, 31));
    }

    #[test]
    fn test_add_months_across_year_boundary() {
        let dt = DateTime::from_ymd(2024, 11, 15).unwrap().add_months(3);
        assert_eq!((dt.year(), dt.month(), dt.day()), (2025, 2, 15));
    }

    #[test]
    fn test_ordering() {
        let a = DateTime::from_ymd(2024, 1, 1).unwrap();
        let b = DateTime::from_ymd(2024, 6, 1).unwrap();
        assert!(a < b);
        assert_eq!(a.min(b), a);
        assert_eq!(a.max(b), b);
    }

    #[test]
    fn test_serde_roundtrip() {
        let dt = DateTime::from_ymd_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let json = serde_json::to_string(&dt).unwrap();
        let parsed: DateTime = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, dt);
    }
}
