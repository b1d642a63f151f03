//! Entity re-exports.

pub use super::holidays::Entity as Holidays;
pub use super::leave_balances::Entity as LeaveBalances;
pub use super::leaves::Entity as Leaves;
pub use super::permissions::Entity as Permissions;
pub use super::users::Entity as Users;
