//! Per-year leave balances.
//!
//! Accrual creates a year's balance, deductions draw approved leave from it,
//! and carry-over moves unused paid days into the following year.
//!
//! The pure rules live in `accrual`, `deduction` and `carry_over`.
//! `BalanceManager` sequences them against a `BalanceStore`.

pub mod accrual;
pub mod carry_over;
pub mod deduction;
mod error;
mod service;
mod types;


pub use accrual::{annual_balance, months_worked_in_year, prorate, prorated_balance};
pub use error::BalanceError;
pub use service::{BalanceManager, BalanceStore};
pub use types::{
    BalanceUpdate, BalanceUpdateResult, CarryForwardChange, CarryOverResult, Deduction,
    GuardedUpdate, LeaveBalance, LeavePolicy, NextYearAdjustment,
};
