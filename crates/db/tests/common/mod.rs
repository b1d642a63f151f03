//! Shared setup for repository tests on in-memory SQLite.

#![allow(dead_code)]

use chrono::NaiveDate;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use leavedesk_core::balance::LeavePolicy;
use leavedesk_db::UserRepository;
use leavedesk_db::migration::Migrator;
use leavedesk_db::repositories::CreateUserInput;
use leavedesk_shared::Role;

/// Fresh migrated database. One pooled connection keeps the memory database alive.
pub async fn setup() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to open sqlite");
    Migrator::up(&db, None).await.expect("Failed to migrate");
    db
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

/// Creates an employee without a hire date and returns its ID.
pub async fn create_employee(db: &DatabaseConnection, email: &str) -> Uuid {
    UserRepository::new(db.clone())
        .create(
            CreateUserInput {
                email: email.to_string(),
                password_hash: "$argon2id$test_hash".to_string(),
                first_name: "Test".to_string(),
                last_name: "Employee".to_string(),
                role: Role::Employee,
                hire_date: None,
            },
            LeavePolicy::default(),
        )
        .await
        .expect("Failed to create user")
        .user
        .id
}
