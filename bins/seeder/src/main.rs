//! Database seeder for LeaveDesk development and testing.
//!
//! Seeds an admin, an employee, the fixed-date public holidays of the current
//! year, and current-year balances. Safe to run more than once.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::DatabaseConnection;

use leavedesk_core::auth::hash_password;
use leavedesk_core::balance::{BalanceError, LeavePolicy};
use leavedesk_db::repositories::{
    CreateUserInput, HolidayError, HolidayRepository, LeaveBalanceRepository, UserRepository,
};
use leavedesk_shared::Role;

/// Development admin account.
const ADMIN_EMAIL: &str = "admin@leavedesk.local";
/// Development employee account.
const EMPLOYEE_EMAIL: &str = "employee@leavedesk.local";
/// Password shared by both development accounts.
const DEV_PASSWORD: &str = "LeaveDesk2024";

/// Public holidays that fall on the same date every year.
const FIXED_HOLIDAYS: [(&str, u32, u32); 8] = [
    ("Jour de l'an", 1, 1),
    ("Fête du Travail", 5, 1),
    ("Victoire 1945", 5, 8),
    ("Fête nationale", 7, 14),
    ("Assomption", 8, 15),
    ("Toussaint", 11, 1),
    ("Armistice 1918", 11, 11),
    ("Noël", 12, 25),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    println!("Connecting to database...");
    let db = leavedesk_db::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    let policy = LeavePolicy::default();
    let year = Utc::now().year();

    println!("Seeding users...");
    seed_user(&db, policy, ADMIN_EMAIL, "Ada", "Admin", Role::Admin).await?;
    seed_user(&db, policy, EMPLOYEE_EMAIL, "Eve", "Employee", Role::Employee).await?;

    println!("Seeding holidays for {year}...");
    seed_holidays(&db, year).await?;

    println!("Seeding leave balances for {year}...");
    seed_balances(&db, policy, year).await?;

    println!("Seeding complete!");
    Ok(())
}

async fn seed_user(
    db: &DatabaseConnection,
    policy: LeavePolicy,
    email: &str,
    first_name: &str,
    last_name: &str,
    role: Role,
) -> anyhow::Result<()> {
    let repo = UserRepository::new(db.clone());
    if repo.email_exists(email).await? {
        println!("  {email} already exists, skipping");
        return Ok(());
    }

    repo.create(
        CreateUserInput {
            email: email.to_string(),
            password_hash: hash_password(DEV_PASSWORD)?,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            role,
            hire_date: None,
        },
        policy,
    )
    .await?;
    println!("  Created {email}");
    Ok(())
}

async fn seed_holidays(db: &DatabaseConnection, year: i32) -> anyhow::Result<()> {
    let repo = HolidayRepository::new(db.clone());
    for (name, month, day) in FIXED_HOLIDAYS {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .with_context(|| format!("invalid holiday date {year}-{month}-{day}"))?;
        match repo.create(name, date).await {
            Ok(_) => println!("  Created {name} ({date})"),
            Err(HolidayError::DuplicateDate(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

async fn seed_balances(
    db: &DatabaseConnection,
    policy: LeavePolicy,
    year: i32,
) -> anyhow::Result<()> {
    let users = UserRepository::new(db.clone());
    let balances = LeaveBalanceRepository::new(db.clone(), policy);

    for email in [ADMIN_EMAIL, EMPLOYEE_EMAIL] {
        let Some(user) = users.find_by_email(email).await? else {
            continue;
        };
        match balances.create_annual(user.id, year).await {
            Ok(balance) => println!(
                "  {email}: {} paid, {} sick",
                balance.remaining_paid_leave, balance.remaining_sick_leave
            ),
            Err(BalanceError::AlreadyExists { .. }) => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
