//! Deducting approved leave days from a balance.

use super::error::BalanceError;
use super::types::{Deduction, LeaveBalance};
use crate::leave::LeaveType;

/// Removes `days` from `balance` for a leave of `leave_type`.
///
/// Paid leave draws on `carried_over_from_previous_year` first and takes the
/// remainder from `remaining_paid_leave`. Every other type draws on the sick
/// pool. The balance is left untouched when an error is returned.
///
/// # Errors
///
/// - `BalanceError::NegativeDays` if `days` is negative
/// - `BalanceError::InsufficientBalance` if paid days exceed remaining plus carried-over
/// - `BalanceError::InsufficientSickBalance` if days exceed the sick pool
pub fn apply_deduction(
    balance: &mut LeaveBalance,
    days: i32,
    leave_type: LeaveType,
) -> Result<Deduction, BalanceError> {
    if days < 0 {
        return Err(BalanceError::NegativeDays(days));
    }

    if leave_type == LeaveType::Paid {
        let available = balance.available_paid_days();
        if days > available {
            return Err(BalanceError::InsufficientBalance {
                requested: days,
                available,
            });
        }

        let from_carried_over = days.min(balance.carried_over_from_previous_year);
        let from_current_year = days - from_carried_over;
        balance.carried_over_from_previous_year -= from_carried_over;
        balance.remaining_paid_leave -= from_current_year;

        Ok(Deduction::Paid {
            from_carried_over,
            from_current_year,
        })
    } else {
        if days > balance.remaining_sick_leave {
            return Err(BalanceError::InsufficientSickBalance {
                requested: days,
                available: balance.remaining_sick_leave,
            });
        }

        balance.remaining_sick_leave -= days;
        Ok(Deduction::Sick { days })
    }
}
