//! User repository for database operations.

use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use leavedesk_core::balance::{
    BalanceError, BalanceManager, LeaveBalance, LeavePolicy, months_worked_in_year,
};
use leavedesk_shared::types::PageRequest;
use leavedesk_shared::{AppError, Role};

use super::leave_balance::SeaBalanceStore;
use crate::entities::{sea_orm_active_enums::UserRole, users};

/// Error types for user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// User not found.
    #[error("User not found: {0}")]
    NotFound(Uuid),

    /// Email already registered.
    #[error("Email already registered: {0}")]
    EmailTaken(String),

    /// Initial balance creation failed.
    #[error(transparent)]
    Balance(#[from] BalanceError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => Self::NotFound(err.to_string()),
            UserError::EmailTaken(_) => Self::Conflict(err.to_string()),
            UserError::Balance(e) => e.into(),
            UserError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Login email.
    pub email: String,
    /// Argon2 PHC hash.
    pub password_hash: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Role.
    pub role: Role,
    /// Hire date; triggers a prorated balance for the hire year.
    pub hire_date: Option<NaiveDate>,
}

/// Input for updating a user. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    /// New email.
    pub email: Option<String>,
    /// New password hash.
    pub password_hash: Option<String>,
    /// New first name.
    pub first_name: Option<String>,
    /// New last name.
    pub last_name: Option<String>,
    /// New role.
    pub role: Option<Role>,
    /// New hire date.
    pub hire_date: Option<NaiveDate>,
}

/// A created user and the balance opened for its hire year.
#[derive(Debug, Clone)]
pub struct CreatedUser {
    /// The stored user.
    pub user: users::Model,
    /// Prorated balance, when a hire date was given.
    pub balance: Option<LeaveBalance>,
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(normalize_email(email)))
            .one(&self.db)
            .await
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&self.db).await
    }

    /// Lists users by last name with the total count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, page: PageRequest) -> Result<(Vec<users::Model>, u64), DbErr> {
        let total = users::Entity::find().count(&self.db).await?;
        let users = users::Entity::find()
            .order_by_asc(users::Column::LastName)
            .order_by_asc(users::Column::FirstName)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;
        Ok((users, total))
    }

    /// Checks if an email is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn email_exists(&self, email: &str) -> Result<bool, DbErr> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(normalize_email(email)))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Creates a user, opening a prorated balance for the hire year when a
    /// hire date is given. Both rows commit together.
    ///
    /// # Errors
    ///
    /// Returns `UserError::EmailTaken` if the email is registered, or a
    /// database error.
    pub async fn create(
        &self,
        input: CreateUserInput,
        policy: LeavePolicy,
    ) -> Result<CreatedUser, UserError> {
        let email = normalize_email(&input.email);
        let txn = self.db.begin().await?;

        let taken = users::Entity::find()
            .filter(users::Column::Email.eq(email.clone()))
            .count(&txn)
            .await?;
        if taken > 0 {
            return Err(UserError::EmailTaken(email));
        }

        let now = Utc::now().into();
        let user = users::ActiveModel {
            id: Set(Uuid::now_v7()),
            email: Set(email),
            password_hash: Set(input.password_hash),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            role: Set(UserRole::from(input.role)),
            hire_date: Set(input.hire_date),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let balance = match user.hire_date {
            Some(hire_date) => {
                let year = hire_date.year();
                let months = months_worked_in_year(hire_date, year);
                let balance = BalanceManager::new(SeaBalanceStore::new(&txn), policy)
                    .create_prorated_balance(user.id, year, months)
                    .await?;
                Some(balance)
            }
            None => None,
        };

        txn.commit().await?;

        info!(user_id = %user.id, role = ?user.role, "user created");
        Ok(CreatedUser { user, balance })
    }

    /// Updates a user.
    ///
    /// # Errors
    ///
    /// Returns `UserError::NotFound` for an unknown ID and
    /// `UserError::EmailTaken` when the new email belongs to someone else.
    pub async fn update(&self, id: Uuid, input: UpdateUserInput) -> Result<users::Model, UserError> {
        let user = self.find_by_id(id).await?.ok_or(UserError::NotFound(id))?;
        let mut active: users::ActiveModel = user.into();

        if let Some(email) = input.email {
            let email = normalize_email(&email);
            let owner = self.find_by_email(&email).await?;
            if owner.is_some_and(|owner| owner.id != id) {
                return Err(UserError::EmailTaken(email));
            }
            active.email = Set(email);
        }
        if let Some(hash) = input.password_hash {
            active.password_hash = Set(hash);
        }
        if let Some(first_name) = input.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = input.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(role) = input.role {
            active.role = Set(role.into());
        }
        if let Some(hire_date) = input.hire_date {
            active.hire_date = Set(Some(hire_date));
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Deletes a user together with their leaves, permissions and balances.
    ///
    /// # Errors
    ///
    /// Returns `UserError::NotFound` for an unknown ID.
    pub async fn delete(&self, id: Uuid) -> Result<(), UserError> {
        let user = self.find_by_id(id).await?.ok_or(UserError::NotFound(id))?;
        user.delete(&self.db).await?;
        info!(user_id = %id, "user deleted");
        Ok(())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
