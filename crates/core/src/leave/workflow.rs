//! Approval workflow shared by leaves and permissions.

use super::error::LeaveError;
use super::types::LeaveStatus;

/// Validates a status change requested by an admin.
///
/// Only pending requests can be decided, and only to `Approved` or
/// `Rejected`.
///
/// # Errors
///
/// Returns `LeaveError::InvalidTransition` for any other change.
pub const fn transition(from: LeaveStatus, to: LeaveStatus) -> Result<LeaveStatus, LeaveError> {
    match (from, to) {
        (LeaveStatus::Pending, LeaveStatus::Approved | LeaveStatus::Rejected) => Ok(to),
        _ => Err(LeaveError::InvalidTransition { from, to }),
    }
}

/// Checks that a request can still be edited or withdrawn by its owner.
///
/// # Errors
///
/// Returns `LeaveError::NotEditable` once the request has been decided.
pub const fn ensure_editable(status: LeaveStatus) -> Result<(), LeaveError> {
    if status.is_editable() {
        Ok(())
    } else {
        Err(LeaveError::NotEditable(status))
    }
}
