//! `SeaORM` entity definitions.

pub mod prelude;

pub mod holidays;
pub mod leave_balances;
pub mod leaves;
pub mod permissions;
pub mod sea_orm_active_enums;
pub mod users;
