//! Leave balance repository.
//!
//! `SeaBalanceStore` implements the core `BalanceStore` over any SeaORM
//! connection. The repository runs every `BalanceManager` call inside one
//! database transaction, so a carry-over or a propagated update commits both
//! years together or neither.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use leavedesk_core::balance::{
    BalanceError, BalanceManager, BalanceStore, BalanceUpdate, BalanceUpdateResult,
    CarryOverResult, Deduction, LeaveBalance, LeavePolicy,
};
use leavedesk_core::leave::LeaveType;
use leavedesk_shared::types::PageRequest;

use crate::entities::leave_balances;

fn store_error(err: &DbErr) -> BalanceError {
    BalanceError::store(err.to_string())
}

/// `BalanceStore` over a SeaORM connection or transaction.
pub struct SeaBalanceStore<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> SeaBalanceStore<'a, C> {
    /// Wraps a connection or transaction.
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }
}

impl<C: ConnectionTrait + Send + Sync> BalanceStore for SeaBalanceStore<'_, C> {
    async fn find(&self, user_id: Uuid, year: i32) -> Result<Option<LeaveBalance>, BalanceError> {
        leave_balances::Entity::find()
            .filter(leave_balances::Column::UserId.eq(user_id))
            .filter(leave_balances::Column::Year.eq(year))
            .one(self.conn)
            .await
            .map(|found| found.map(Into::into))
            .map_err(|e| store_error(&e))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<LeaveBalance>, BalanceError> {
        leave_balances::Entity::find_by_id(id)
            .one(self.conn)
            .await
            .map(|found| found.map(Into::into))
            .map_err(|e| store_error(&e))
    }

    async fn insert(&self, balance: LeaveBalance) -> Result<LeaveBalance, BalanceError> {
        let (user_id, year) = (balance.user_id, balance.year);

        leave_balances::ActiveModel::from(balance)
            .insert(self.conn)
            .await
            .map(Into::into)
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    BalanceError::AlreadyExists { user_id, year }
                }
                _ => store_error(&e),
            })
    }

    async fn save(&self, balance: LeaveBalance) -> Result<LeaveBalance, BalanceError> {
        let id = balance.id;

        leave_balances::ActiveModel::from(balance)
            .update(self.conn)
            .await
            .map(Into::into)
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => BalanceError::NotFoundById(id),
                other => store_error(&other),
            })
    }
}

/// Filters for listing balances.
#[derive(Debug, Clone, Copy, Default)]
pub struct BalanceFilter {
    /// Only this user's balances.
    pub user_id: Option<Uuid>,
    /// Only this year.
    pub year: Option<i32>,
}

/// Leave balance repository.
#[derive(Debug, Clone)]
pub struct LeaveBalanceRepository {
    db: DatabaseConnection,
    policy: LeavePolicy,
}

impl LeaveBalanceRepository {
    /// Creates a new leave balance repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, policy: LeavePolicy) -> Self {
        Self { db, policy }
    }

    /// Finds a balance by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<LeaveBalance>, DbErr> {
        Ok(leave_balances::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Into::into))
    }

    /// Lists balances ordered by year, newest first, with the total match count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: BalanceFilter,
        page: PageRequest,
    ) -> Result<(Vec<LeaveBalance>, u64), DbErr> {
        let mut query = leave_balances::Entity::find();
        if let Some(user_id) = filter.user_id {
            query = query.filter(leave_balances::Column::UserId.eq(user_id));
        }
        if let Some(year) = filter.year {
            query = query.filter(leave_balances::Column::Year.eq(year));
        }

        let total = query.clone().count(&self.db).await?;
        let balances = query
            .order_by_desc(leave_balances::Column::Year)
            .order_by_asc(leave_balances::Column::UserId)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((balances.into_iter().map(Into::into).collect(), total))
    }

    /// Creates a full-year balance.
    ///
    /// # Errors
    ///
    /// Returns `BalanceError::AlreadyExists` if the user already has one for
    /// `year`, or a store error.
    pub async fn create_annual(&self, user_id: Uuid, year: i32) -> Result<LeaveBalance, BalanceError> {
        let txn = self.db.begin().await.map_err(|e| store_error(&e))?;
        let balance = BalanceManager::new(SeaBalanceStore::new(&txn), self.policy)
            .create_annual_balance(user_id, year)
            .await?;
        txn.commit().await.map_err(|e| store_error(&e))?;
        Ok(balance)
    }

    /// Creates a prorated balance, or returns the existing one.
    ///
    /// # Errors
    ///
    /// Returns an error if `months_worked` is negative or the store fails.
    pub async fn create_prorated(
        &self,
        user_id: Uuid,
        year: i32,
        months_worked: i32,
    ) -> Result<LeaveBalance, BalanceError> {
        let txn = self.db.begin().await.map_err(|e| store_error(&e))?;
        let balance = BalanceManager::new(SeaBalanceStore::new(&txn), self.policy)
            .create_prorated_balance(user_id, year, months_worked)
            .await?;
        txn.commit().await.map_err(|e| store_error(&e))?;
        Ok(balance)
    }

    /// Deducts days from the user's balance for `year`.
    ///
    /// # Errors
    ///
    /// Returns an error if the balance is missing or too small.
    pub async fn deduct(
        &self,
        user_id: Uuid,
        year: i32,
        days: i32,
        leave_type: LeaveType,
    ) -> Result<(LeaveBalance, Deduction), BalanceError> {
        let txn = self.db.begin().await.map_err(|e| store_error(&e))?;
        let result = BalanceManager::new(SeaBalanceStore::new(&txn), self.policy)
            .deduct(user_id, year, days, leave_type)
            .await?;
        txn.commit().await.map_err(|e| store_error(&e))?;
        Ok(result)
    }

    /// Carries days from `from_year` into the following year.
    ///
    /// # Errors
    ///
    /// Returns an error if the source balance is missing or holds fewer
    /// remaining paid days than requested.
    pub async fn carry_over(
        &self,
        user_id: Uuid,
        from_year: i32,
        days: i32,
    ) -> Result<CarryOverResult, BalanceError> {
        let txn = self.db.begin().await.map_err(|e| store_error(&e))?;
        let result = BalanceManager::new(SeaBalanceStore::new(&txn), self.policy)
            .carry_over(user_id, from_year, days)
            .await?;
        txn.commit().await.map_err(|e| store_error(&e))?;
        Ok(result)
    }

    /// Applies a client update, propagating a changed carry-forward.
    ///
    /// # Errors
    ///
    /// Returns an error if the balance is missing or the carry-forward is negative.
    pub async fn update(
        &self,
        id: Uuid,
        update: &BalanceUpdate,
    ) -> Result<BalanceUpdateResult, BalanceError> {
        let txn = self.db.begin().await.map_err(|e| store_error(&e))?;
        let result = BalanceManager::new(SeaBalanceStore::new(&txn), self.policy)
            .apply_update(id, update)
            .await?;
        txn.commit().await.map_err(|e| store_error(&e))?;
        Ok(result)
    }
}
