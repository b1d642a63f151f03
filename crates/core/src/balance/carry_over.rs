//! Carry-over between consecutive years.
//!
//! Three pure steps shared by the explicit carry-over call and the guarded
//! update path:
//! - `apply_carry_forward` earmarks days on the source year
//! - `guard_update` reduces a client update to a carry-forward change
//! - `adjust_next_year` writes the carry-in onto the following year

use super::error::BalanceError;
use super::types::{BalanceUpdate, CarryForwardChange, GuardedUpdate, LeaveBalance, NextYearAdjustment};

/// Earmarks `days` of `from`'s remaining paid leave for next year.
///
/// Sets `carried_over_to_next_year` to `days` and removes them from
/// `remaining_paid_leave`. Days already carried in from the year before do
/// not count toward what may be carried forward.
///
/// # Errors
///
/// - `BalanceError::NegativeDays` if `days` is negative
/// - `BalanceError::CarryOverExceedsRemaining` if `days` exceeds `remaining_paid_leave`
pub fn apply_carry_forward(from: &mut LeaveBalance, days: i32) -> Result<(), BalanceError> {
    if days < 0 {
        return Err(BalanceError::NegativeDays(days));
    }
    if days > from.remaining_paid_leave {
        return Err(BalanceError::CarryOverExceedsRemaining {
            requested: days,
            remaining: from.remaining_paid_leave,
        });
    }

    from.carried_over_to_next_year = days;
    from.remaining_paid_leave -= days;
    Ok(())
}

/// Filters a client update down to the one field clients may change.
///
/// Every field except `carried_over_to_next_year` keeps its stored value,
/// whatever the update says.
///
/// # Errors
///
/// Returns `BalanceError::NegativeDays` if the submitted carry-forward is negative.
pub fn guard_update(
    stored: &LeaveBalance,
    update: &BalanceUpdate,
) -> Result<GuardedUpdate, BalanceError> {
    let current = update
        .carried_over_to_next_year
        .unwrap_or(stored.carried_over_to_next_year);
    if current < 0 {
        return Err(BalanceError::NegativeDays(current));
    }

    let previous = stored.carried_over_to_next_year;
    let balance = LeaveBalance {
        carried_over_to_next_year: current,
        ..stored.clone()
    };
    let change = (current != previous).then_some(CarryForwardChange { previous, current });

    Ok(GuardedUpdate { balance, change })
}

/// Writes a carry-in of `carried_in` days onto the following year's record.
///
/// `remaining_paid_leave` is recomputed as `initial_paid_leave + carried_in`,
/// which gives back any paid days already deducted from `next`. `received`
/// is the carry-in `next` was last given; the returned `discarded_days`
/// reports how many consumed days the recomputation restores.
pub fn adjust_next_year(
    next: &mut LeaveBalance,
    received: i32,
    carried_in: i32,
) -> NextYearAdjustment {
    let previous_carry_in = next.carried_over_from_previous_year;
    let previous_remaining = next.remaining_paid_leave;
    let discarded_days = consumed_paid_days(next, received);

    next.carried_over_from_previous_year = carried_in;
    next.remaining_paid_leave = next.initial_paid_leave + carried_in;

    NextYearAdjustment {
        previous_carry_in,
        previous_remaining,
        discarded_days,
    }
}

/// Paid days deducted from `balance` since it received `received` days.
///
/// Deductions drain the carry-in before current-year days. A record written
/// by `adjust_next_year` starts at `initial + received` remaining days, one
/// seeded by annual accrual at `initial`. Once the carry-in is used up and
/// remaining has dropped to `initial` or below the two starts look alike, so
/// the count is a lower bound there. It is never zero when days were used.
fn consumed_paid_days(balance: &LeaveBalance, received: i32) -> i32 {
    let from_carry_in = (received - balance.carried_over_from_previous_year).max(0);
    let start = if balance.remaining_paid_leave > balance.initial_paid_leave {
        balance.initial_paid_leave + received
    } else {
        balance.initial_paid_leave
    };
    from_carry_in + (start - balance.remaining_paid_leave).max(0)
}
