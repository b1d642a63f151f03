//! Working-day arithmetic for leave requests.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Weekday};

use super::error::LeaveError;

/// Checks that `end` is not before `start`.
///
/// # Errors
///
/// Returns `LeaveError::InvalidDateRange` if `end < start`.
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), LeaveError> {
    if end < start {
        return Err(LeaveError::InvalidDateRange { start, end });
    }
    Ok(())
}

/// Returns true for Monday through Friday.
#[must_use]
pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Counts the days in `start..=end` that are neither weekend days nor holidays.
///
/// An inverted range counts zero days.
#[must_use]
pub fn working_days(start: NaiveDate, end: NaiveDate, holidays: &HashSet<NaiveDate>) -> i32 {
    let count = start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| is_weekday(*day) && !holidays.contains(day))
        .count();
    i32::try_from(count).unwrap_or(i32::MAX)
}
