//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod holiday;
pub mod leave;
pub mod leave_balance;
pub mod permission;
pub mod user;

pub use holiday::{HolidayError, HolidayRepository};
pub use leave::{
    CreateLeaveInput, LeaveFilter, LeaveRepoError, LeaveRepository, StatusChange, UpdateLeaveInput,
};
pub use leave_balance::{BalanceFilter, LeaveBalanceRepository, SeaBalanceStore};
pub use permission::{
    CreatePermissionInput, PermissionError, PermissionFilter, PermissionRepository,
    UpdatePermissionInput,
};
pub use user::{CreateUserInput, CreatedUser, UpdateUserInput, UserError, UserRepository};
