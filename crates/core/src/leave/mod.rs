//! Leave requests: types, working-day counting and the approval workflow.

pub mod calendar;
mod error;
mod types;
pub mod workflow;

pub use calendar::{validate_date_range, working_days};
pub use error::LeaveError;
pub use types::{LeaveStatus, LeaveType};
