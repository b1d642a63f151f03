//! Core business logic for LeaveDesk.
//!
//! This crate contains pure business logic with no web or database
//! dependencies. Persistence comes in through the `BalanceStore` trait.
//!
//! # Modules
//!
//! - `balance` - Per-year balances: accrual, deduction, carry-over
//! - `leave` - Leave types, working-day counting, approval workflow
//! - `permission` - Short absences within a day
//! - `certificate` - Certificate upload/download and `Content-Disposition`
//! - `auth` - Password hashing
//! - `storage` - Object storage through OpenDAL

pub mod auth;
pub mod balance;
pub mod certificate;
pub mod leave;
pub mod permission;
pub mod storage;
