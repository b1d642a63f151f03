//! Leave and permission error types.

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use leavedesk_shared::AppError;

use super::types::LeaveStatus;

/// Errors raised by leave and permission rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LeaveError {
    /// End date before start date.
    #[error("end date {end} is before start date {start}")]
    InvalidDateRange {
        /// First day of the leave.
        start: NaiveDate,
        /// Last day of the leave.
        end: NaiveDate,
    },

    /// End time not after start time.
    #[error("end time {end} must be after start time {start}")]
    InvalidTimeRange {
        /// Start of the absence.
        start: NaiveTime,
        /// End of the absence.
        end: NaiveTime,
    },

    /// Status change outside the allowed transitions.
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: LeaveStatus,
        /// Requested status.
        to: LeaveStatus,
    },

    /// Only pending requests may be edited or withdrawn.
    #[error("request is {0} and can no longer be changed")]
    NotEditable(LeaveStatus),
}

impl From<LeaveError> for AppError {
    fn from(err: LeaveError) -> Self {
        match err {
            LeaveError::InvalidDateRange { .. } | LeaveError::InvalidTimeRange { .. } => {
                Self::Validation(err.to_string())
            }
            LeaveError::InvalidTransition { .. } | LeaveError::NotEditable(_) => {
                Self::BusinessRule(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_mapping() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let range: AppError = LeaveError::InvalidDateRange { start, end }.into();
        assert_eq!(range.status_code(), 400);

        let transition: AppError = LeaveError::InvalidTransition {
            from: LeaveStatus::Approved,
            to: LeaveStatus::Rejected,
        }
        .into();
        assert_eq!(transition.error_code(), "BUSINESS_RULE_VIOLATION");
        assert_eq!(
            transition.to_string(),
            "Business rule violation: invalid status transition from Approuvé to Rejeté"
        );
    }
}
