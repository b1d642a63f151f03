//! Permissions: short absences inside a single working day.
//!
//! They go through the same approval workflow as leaves but never touch a
//! balance.

use chrono::NaiveTime;

use crate::leave::LeaveError;

/// Checks that the absence ends after it starts.
///
/// # Errors
///
/// Returns `LeaveError::InvalidTimeRange` if `end <= start`.
pub fn validate_time_range(start: NaiveTime, end: NaiveTime) -> Result<(), LeaveError> {
    if end <= start {
        return Err(LeaveError::InvalidTimeRange { start, end });
    }
    Ok(())
}

/// Length of the absence in minutes.
#[must_use]
pub fn duration_minutes(start: NaiveTime, end: NaiveTime) -> i64 {
    (end - start).num_minutes()
}
