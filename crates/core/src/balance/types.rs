//! Leave balance domain types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use leavedesk_shared::config::LeavePolicyConfig;

/// Days granted per calendar year before proration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeavePolicy {
    /// Paid leave days for a full year.
    pub annual_paid_days: i32,
    /// Sick leave days for a full year.
    pub annual_sick_days: i32,
}

impl LeavePolicy {
    /// Paid days granted for a full year when nothing is configured.
    pub const DEFAULT_PAID_DAYS: i32 = 22;
    /// Sick days granted for a full year when nothing is configured.
    pub const DEFAULT_SICK_DAYS: i32 = 15;
}

impl Default for LeavePolicy {
    fn default() -> Self {
        Self {
            annual_paid_days: Self::DEFAULT_PAID_DAYS,
            annual_sick_days: Self::DEFAULT_SICK_DAYS,
        }
    }
}

impl From<LeavePolicyConfig> for LeavePolicy {
    fn from(config: LeavePolicyConfig) -> Self {
        Self {
            annual_paid_days: config.annual_paid_days,
            annual_sick_days: config.annual_sick_days,
        }
    }
}

/// A user's leave figures for one calendar year.
///
/// `(user_id, year)` is unique. The three day counters that deductions touch
/// never go below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveBalance {
    /// Record ID.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Calendar year.
    pub year: i32,
    /// Paid days granted at year start.
    pub initial_paid_leave: i32,
    /// Sick days granted at year start.
    pub initial_sick_leave: i32,
    /// Paid days still available from this year's grant.
    pub remaining_paid_leave: i32,
    /// Sick days still available.
    pub remaining_sick_leave: i32,
    /// Days received from last year, consumed before this year's paid days.
    pub carried_over_from_previous_year: i32,
    /// Days earmarked to roll into next year.
    pub carried_over_to_next_year: i32,
}

impl LeaveBalance {
    /// Total paid days a deduction may draw on.
    #[must_use]
    pub const fn available_paid_days(&self) -> i32 {
        self.remaining_paid_leave + self.carried_over_from_previous_year
    }
}

/// Fields a client submits when updating a balance.
///
/// Only `carried_over_to_next_year` is honoured; the other fields are
/// accepted so a full record can be PUT back, then replaced with the stored
/// values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceUpdate {
    /// Submitted year (ignored).
    pub year: Option<i32>,
    /// Submitted initial paid days (ignored).
    pub initial_paid_leave: Option<i32>,
    /// Submitted initial sick days (ignored).
    pub initial_sick_leave: Option<i32>,
    /// Submitted remaining paid days (ignored).
    pub remaining_paid_leave: Option<i32>,
    /// Submitted remaining sick days (ignored).
    pub remaining_sick_leave: Option<i32>,
    /// Submitted carry-in (ignored).
    pub carried_over_from_previous_year: Option<i32>,
    /// New carry-forward figure.
    pub carried_over_to_next_year: Option<i32>,
}

/// Where the days of a deduction were taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "pool", rename_all = "camelCase")]
pub enum Deduction {
    /// Paid leave, carried-over days first.
    #[serde(rename_all = "camelCase")]
    Paid {
        /// Days taken from `carried_over_from_previous_year`.
        from_carried_over: i32,
        /// Days taken from `remaining_paid_leave`.
        from_current_year: i32,
    },
    /// Sick leave pool.
    Sick {
        /// Days taken from `remaining_sick_leave`.
        days: i32,
    },
}

impl Deduction {
    /// Total days removed.
    #[must_use]
    pub const fn total(&self) -> i32 {
        match self {
            Self::Paid {
                from_carried_over,
                from_current_year,
            } => *from_carried_over + *from_current_year,
            Self::Sick { days } => *days,
        }
    }
}

/// A detected change of `carried_over_to_next_year`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarryForwardChange {
    /// Stored value before the update.
    pub previous: i32,
    /// Value after the update.
    pub current: i32,
}

/// Result of filtering a client update against the stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardedUpdate {
    /// The record to persist.
    pub balance: LeaveBalance,
    /// Set when the carry-forward figure changed.
    pub change: Option<CarryForwardChange>,
}

/// What `adjust_next_year` did to the following year's record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextYearAdjustment {
    /// Carry-in before the adjustment.
    pub previous_carry_in: i32,
    /// Remaining paid days before the adjustment.
    pub previous_remaining: i32,
    /// Paid days already consumed that the recomputation gives back.
    pub discarded_days: i32,
}

/// Both sides of an explicit carry-over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarryOverResult {
    /// The source year after the carry-forward.
    pub from: LeaveBalance,
    /// The following year after receiving the days.
    pub to: LeaveBalance,
    /// Days already used in the following year that the carry-in gave back.
    pub discarded_days: i32,
}

/// Outcome of the guarded update path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceUpdateResult {
    /// The persisted record.
    pub balance: LeaveBalance,
    /// The following year's record when propagation touched it.
    pub next_year: Option<LeaveBalance>,
    /// Days already used in the following year that propagation gave back.
    pub discarded_days: i32,
}
