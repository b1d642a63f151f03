//! `SeaORM` Entity for leave_balances table.
//!
//! `(user_id, year)` carries a unique index created by the migration.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use leavedesk_core::balance::LeaveBalance;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "leave_balances")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub year: i32,
    pub initial_paid_leave: i32,
    pub initial_sick_leave: i32,
    pub remaining_paid_leave: i32,
    pub remaining_sick_leave: i32,
    pub carried_over_from_previous_year: i32,
    pub carried_over_to_next_year: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for LeaveBalance {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            year: m.year,
            initial_paid_leave: m.initial_paid_leave,
            initial_sick_leave: m.initial_sick_leave,
            remaining_paid_leave: m.remaining_paid_leave,
            remaining_sick_leave: m.remaining_sick_leave,
            carried_over_from_previous_year: m.carried_over_from_previous_year,
            carried_over_to_next_year: m.carried_over_to_next_year,
        }
    }
}

impl From<LeaveBalance> for ActiveModel {
    fn from(b: LeaveBalance) -> Self {
        use sea_orm::Set;

        Self {
            id: Set(b.id),
            user_id: Set(b.user_id),
            year: Set(b.year),
            initial_paid_leave: Set(b.initial_paid_leave),
            initial_sick_leave: Set(b.initial_sick_leave),
            remaining_paid_leave: Set(b.remaining_paid_leave),
            remaining_sick_leave: Set(b.remaining_sick_leave),
            carried_over_from_previous_year: Set(b.carried_over_from_previous_year),
            carried_over_to_next_year: Set(b.carried_over_to_next_year),
        }
    }
}
