//! Periodic due-date generators.
//!
//! Month-based generators anchor on the start date's day-of-month: each
//! generated date keeps the anchor day, clamped to shorter months, instead
//! of drifting after a clamped month.

use crate::error::{CoreError, CoreResult};
use crate::time::DateTime;

fn validate_count(num_payments: u32) -> CoreResult<()> {
    if num_payments == 0 {
        return Err(CoreError::invalid_input("num_payments must be at least 1"));
    }
    Ok(())
}

/// Generates monthly due dates anchored on the start date's day-of-month.
///
/// # Errors
///
/// Returns `CoreError::InvalidInput` if `num_payments` is zero.
pub fn monthly_dates(start: DateTime, num_payments: u32) -> CoreResult<Vec<DateTime>> {
    months_apart(start, num_payments, 1)
}

/// Generates quarterly due dates anchored on the start date's day-of-month.
///
/// # Errors
///
/// Returns `CoreError::InvalidInput` if `num_payments` is zero.
pub fn quarterly_dates(start: DateTime, num_payments: u32) -> CoreResult<Vec<DateTime>> {
    months_apart(start, num_payments, 3)
}

/// Generates annual due dates anchored on the start date's day-of-month.
///
/// # Errors
///
/// Returns `CoreError::InvalidInput` if `num_payments` is zero.
pub fn annual_dates(start: DateTime, num_payments: u32) -> CoreResult<Vec<DateTime>> {
    months_apart(start, num_payments, 12)
}

fn months_apart(start: DateTime, num_payments: u32, step: i32) -> CoreResult<Vec<DateTime>> {
    validate_count(num_payments)?;
    Ok((0..num_payments)
        .map(|i| start.add_months(step * i as i32))
        .collect())
}

/// Generates weekly due dates.
///
/// # Errors
///
/// Returns `CoreError::InvalidInput` if `num_payments` is zero.
pub fn weekly_dates(start: DateTime, num_payments: u32) -> CoreResult<Vec<DateTime>> {
    every_n_days(start, num_payments, 7)
}

/// Generates bi-weekly (14-day) due dates.
///
/// # Errors
///
/// Returns `CoreError::InvalidInput` if `num_payments` is zero.
pub fn biweekly_dates(start: DateTime, num_payments: u32) -> CoreResult<Vec<DateTime>> {
    every_n_days(start, num_payments, 14)
}

/// Generates due dates a fixed number of days apart.
///
/// # Errors
///
/// Returns `CoreError::InvalidInput` if `num_payments` is zero or the
/// interval is shorter than a day.
pub fn every_n_days(
    start: DateTime,
    num_payments: u32,
    interval_days: u32,
) -> CoreResult<Vec<DateTime>> {
    validate_count(num_payments)?;
    if interval_days == 0 {
        return Err(CoreError::invalid_input("interval_days must be at least 1"));
    }
    Ok((0..num_payments)
        .map(|i| start.add_days(i64::from(interval_days) * i64::from(i)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32) -> DateTime {
        DateTime::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn test_monthly_dates() {
        let dates = monthly_dates(dt(2024, 1, 15), 3).unwrap();
        assert_eq!(dates, vec![dt(2024, 1, 15), dt(2024, 2, 15), dt(2024, 3, 15)]);
    }

    #[test]
    fn test_monthly_dates_anchored_through_short_month() {
        let dates = monthly_dates(dt(2024, 1, 31), 4).unwrap();
        // Day 31 is kept as the anchor, clamping only where needed
        assert_eq!(
            dates,
            vec![dt(2024, 1, 31), dt(2024, 2, 29), dt(2024, 3, 31), dt(2024, 4, 30)]
        );
    }

    #[test]
    fn test_quarterly_dates() {
        let dates = quarterly_dates(dt(2024, 1, 15), 4).unwrap();
        assert_eq!(
            dates,
            vec![dt(2024, 1, 15), dt(2024, 4, 15), dt(2024, 7, 15), dt(2024, 10, 15)]
        );
    }

    #[test]
    fn test_annual_dates() {
        let dates = annual_dates(dt(2024, 1, 15), 3).unwrap();
        assert_eq!(dates, vec![dt(2024, 1, 15), dt(2025, 1, 15), dt(2026, 1, 15)]);
    }

    #[test]
    fn test_weekly_and_biweekly() {
        let weekly = weekly_dates(dt(2024, 1, 1), 3).unwrap();
        assert_eq!(weekly, vec![dt(2024, 1, 1), dt(2024, 1, 8), dt(2024, 1, 15)]);

        let biweekly = biweekly_dates(dt(2024, 1, 1), 3).unwrap();
        assert_eq!(biweekly, vec![dt(2024, 1, 1), dt(2024, 1, 15), dt(2024, 1, 29)]);
    }

    #[test]
    fn test_custom_interval() {
        let dates = every_n_days(dt(2024, 1, 1), 4, 10).unwrap();
        assert_eq!(
            dates,
            vec![dt(2024, 1, 1), dt(2024, 1, 11), dt(2024, 1, 21), dt(2024, 1, 31)]
        );
    }

    #[test]
    fn test_zero_payments_rejected() {
        assert!(monthly_dates(dt(2024, 1, 1), 0).is_err());
        assert!(every_n_days(dt(2024, 1, 1), 0, 10).is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(every_n_days(dt(2024, 1, 1), 4, 0).is_err());
    }
}
