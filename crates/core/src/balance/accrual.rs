//! Annual and prorated balance creation.

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use super::error::BalanceError;
use super::types::{LeaveBalance, LeavePolicy};

/// Months in a full accrual year.
pub const MONTHS_PER_YEAR: i32 = 12;

/// Prorates `annual_days` to `months_worked`.
///
/// Computes `round(annual_days / 12 * months_worked)` rounding half away from
/// zero, in integer arithmetic. Twelve or more months yield `annual_days`.
///
/// # Errors
///
/// Returns `BalanceError::NegativeMonths` if `months_worked` is negative.
pub fn prorate(annual_days: i32, months_worked: i32) -> Result<i32, BalanceError> {
    if months_worked < 0 {
        return Err(BalanceError::NegativeMonths(months_worked));
    }
    if months_worked >= MONTHS_PER_YEAR {
        return Ok(annual_days);
    }
    let scaled = annual_days * months_worked;
    let half = MONTHS_PER_YEAR / 2;
    let rounded = if scaled >= 0 {
        (scaled + half) / MONTHS_PER_YEAR
    } else {
        (scaled - half) / MONTHS_PER_YEAR
    };
    Ok(rounded)
}

/// Months of `year` an employee hired on `hire_date` works, counting the hire month.
#[must_use]
pub fn months_worked_in_year(hire_date: NaiveDate, year: i32) -> i32 {
    match hire_date.year().cmp(&year) {
        std::cmp::Ordering::Less => MONTHS_PER_YEAR,
        std::cmp::Ordering::Greater => 0,
        // month() is 1..=12
        std::cmp::Ordering::Equal => MONTHS_PER_YEAR + 1 - hire_date.month().cast_signed(),
    }
}

/// Builds a full-year balance, seeding the carry-in from last year's carry-forward.
#[must_use]
pub fn annual_balance(
    user_id: Uuid,
    year: i32,
    policy: LeavePolicy,
    previous_year: Option<&LeaveBalance>,
) -> LeaveBalance {
    let carried_in = previous_year
        .map(|prev| prev.carried_over_to_next_year)
        .filter(|days| *days > 0)
        .unwrap_or(0);

    LeaveBalance {
        id: Uuid::now_v7(),
        user_id,
        year,
        initial_paid_leave: policy.annual_paid_days,
        initial_sick_leave: policy.annual_sick_days,
        remaining_paid_leave: policy.annual_paid_days,
        remaining_sick_leave: policy.annual_sick_days,
        carried_over_from_previous_year: carried_in,
        carried_over_to_next_year: 0,
    }
}

/// Builds a balance prorated to `months_worked`, with no carry in either direction.
///
/// # Errors
///
/// Returns `BalanceError::NegativeMonths` if `months_worked` is negative.
pub fn prorated_balance(
    user_id: Uuid,
    year: i32,
    policy: LeavePolicy,
    months_worked: i32,
) -> Result<LeaveBalance, BalanceError> {
    let paid = prorate(policy.annual_paid_days, months_worked)?;
    let sick = prorate(policy.annual_sick_days, months_worked)?;

    Ok(LeaveBalance {
        id: Uuid::now_v7(),
        user_id,
        year,
        initial_paid_leave: paid,
        initial_sick_leave: sick,
        remaining_paid_leave: paid,
        remaining_sick_leave: sick,
        carried_over_from_previous_year: 0,
        carried_over_to_next_year: 0,
    })
}
