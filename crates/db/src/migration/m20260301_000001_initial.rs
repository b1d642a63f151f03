//! Initial database migration.
//!
//! Tables are generated from the entity definitions so the same migration
//! runs on Postgres and on the SQLite databases used in tests.

use sea_orm::{EntityTrait, Schema};
use sea_orm_migration::prelude::*;

use crate::entities::{holidays, leave_balances, leaves, permissions, users};

#[derive(DeriveMigrationName)]
pub struct Migration;

const BALANCE_USER_YEAR_INDEX: &str = "idx_leave_balances_user_year";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        // Parents first for the foreign keys
        create_from_entity(manager, &schema, users::Entity).await?;
        create_from_entity(manager, &schema, holidays::Entity).await?;
        create_from_entity(manager, &schema, leaves::Entity).await?;
        create_from_entity(manager, &schema, permissions::Entity).await?;
        create_from_entity(manager, &schema, leave_balances::Entity).await?;

        manager
            .create_index(
                Index::create()
                    .name(BALANCE_USER_YEAR_INDEX)
                    .table(leave_balances::Entity)
                    .col(leave_balances::Column::UserId)
                    .col(leave_balances::Column::Year)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(leave_balances::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(permissions::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(leaves::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(holidays::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(users::Entity).to_owned())
            .await
    }
}

async fn create_from_entity<E: EntityTrait>(
    manager: &SchemaManager<'_>,
    schema: &Schema,
    entity: E,
) -> Result<(), DbErr> {
    manager
        .create_table(schema.create_table_from_entity(entity))
        .await?;
    for index in schema.create_index_from_entity(entity) {
        manager.create_index(index).await?;
    }
    Ok(())
}
