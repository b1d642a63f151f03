//! Leave request repository.
//!
//! Approval is the one write that touches two tables: the status change and
//! the balance deduction commit in the same transaction.

use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use leavedesk_core::balance::{BalanceError, BalanceManager, Deduction, LeavePolicy};
use leavedesk_core::leave::workflow::{ensure_editable, transition};
use leavedesk_core::leave::{LeaveError, LeaveStatus, LeaveType, validate_date_range, working_days};
use leavedesk_shared::AppError;
use leavedesk_shared::types::PageRequest;

use super::holiday::HolidayRepository;
use super::leave_balance::SeaBalanceStore;
use crate::entities::leaves;
use crate::entities::sea_orm_active_enums::{LeaveKind, RequestStatus};

/// Error types for leave operations.
#[derive(Debug, thiserror::Error)]
pub enum LeaveRepoError {
    /// Leave not found.
    #[error("Leave not found: {0}")]
    NotFound(Uuid),

    /// Dates or workflow rule violated.
    #[error(transparent)]
    Rule(#[from] LeaveError),

    /// Approval could not be deducted.
    #[error(transparent)]
    Balance(#[from] BalanceError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<LeaveRepoError> for AppError {
    fn from(err: LeaveRepoError) -> Self {
        match err {
            LeaveRepoError::NotFound(_) => Self::NotFound(err.to_string()),
            LeaveRepoError::Rule(e) => e.into(),
            LeaveRepoError::Balance(e) => e.into(),
            LeaveRepoError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Filters for listing leaves.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeaveFilter {
    /// Only this user's leaves.
    pub user_id: Option<Uuid>,
    /// Only this status.
    pub status: Option<LeaveStatus>,
    /// Only this type.
    pub leave_type: Option<LeaveType>,
}

/// Input for creating a leave.
#[derive(Debug, Clone)]
pub struct CreateLeaveInput {
    /// Owner.
    pub user_id: Uuid,
    /// Kind of leave.
    pub leave_type: LeaveType,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day, inclusive.
    pub end_date: NaiveDate,
    /// Free-text reason.
    pub reason: Option<String>,
}

/// Input for editing a pending leave. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateLeaveInput {
    /// New kind of leave.
    pub leave_type: Option<LeaveType>,
    /// New first day.
    pub start_date: Option<NaiveDate>,
    /// New last day.
    pub end_date: Option<NaiveDate>,
    /// New reason.
    pub reason: Option<String>,
}

/// Outcome of a status change.
#[derive(Debug, Clone)]
pub struct StatusChange {
    /// The leave after the change.
    pub leave: leaves::Model,
    /// Working days counted for an approval.
    pub working_days: i32,
    /// What the approval took from the balance, if anything.
    pub deduction: Option<Deduction>,
}

/// Leave repository.
#[derive(Debug, Clone)]
pub struct LeaveRepository {
    db: DatabaseConnection,
    policy: LeavePolicy,
}

impl LeaveRepository {
    /// Creates a new leave repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, policy: LeavePolicy) -> Self {
        Self { db, policy }
    }

    /// Finds a leave by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<leaves::Model>, DbErr> {
        leaves::Entity::find_by_id(id).one(&self.db).await
    }

    /// Lists leaves, newest start date first, with the total match count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: LeaveFilter,
        page: PageRequest,
    ) -> Result<(Vec<leaves::Model>, u64), DbErr> {
        let mut query = leaves::Entity::find();
        if let Some(user_id) = filter.user_id {
            query = query.filter(leaves::Column::UserId.eq(user_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(leaves::Column::Status.eq(RequestStatus::from(status)));
        }
        if let Some(leave_type) = filter.leave_type {
            query = query.filter(leaves::Column::LeaveType.eq(LeaveKind::from(leave_type)));
        }

        let total = query.clone().count(&self.db).await?;
        let leaves = query
            .order_by_desc(leaves::Column::StartDate)
            .order_by_desc(leaves::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((leaves, total))
    }

    /// Files a pending leave.
    ///
    /// # Errors
    ///
    /// Returns `LeaveError::InvalidDateRange` if the leave ends before it starts.
    pub async fn create(&self, input: CreateLeaveInput) -> Result<leaves::Model, LeaveRepoError> {
        validate_date_range(input.start_date, input.end_date)?;

        let now = Utc::now().into();
        let leave = leaves::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(input.user_id),
            leave_type: Set(input.leave_type.into()),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            reason: Set(input.reason),
            status: Set(LeaveStatus::Pending.into()),
            certificate_name: Set(None),
            certificate_key: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(leave_id = %leave.id, user_id = %leave.user_id, "leave filed");
        Ok(leave)
    }

    /// Edits a pending leave.
    ///
    /// # Errors
    ///
    /// Returns `LeaveError::NotEditable` once the leave is decided, and
    /// `LeaveError::InvalidDateRange` if the merged dates are inverted.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateLeaveInput,
    ) -> Result<leaves::Model, LeaveRepoError> {
        let leave = self.find_by_id(id).await?.ok_or(LeaveRepoError::NotFound(id))?;
        ensure_editable(leave.status.into())?;

        let start_date = input.start_date.unwrap_or(leave.start_date);
        let end_date = input.end_date.unwrap_or(leave.end_date);
        validate_date_range(start_date, end_date)?;

        let mut active: leaves::ActiveModel = leave.into();
        active.start_date = Set(start_date);
        active.end_date = Set(end_date);
        if let Some(leave_type) = input.leave_type {
            active.leave_type = Set(leave_type.into());
        }
        if let Some(reason) = input.reason {
            active.reason = Set(Some(reason));
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Deletes a leave. Without `force`, only pending leaves may go.
    ///
    /// # Errors
    ///
    /// Returns `LeaveError::NotEditable` for a decided leave when `force` is false.
    pub async fn delete(&self, id: Uuid, force: bool) -> Result<leaves::Model, LeaveRepoError> {
        let leave = self.find_by_id(id).await?.ok_or(LeaveRepoError::NotFound(id))?;
        if !force {
            ensure_editable(leave.status.into())?;
        }
        leave.clone().delete(&self.db).await?;
        info!(leave_id = %id, "leave deleted");
        Ok(leave)
    }

    /// Moves a leave to `to`. Approving a paid or sick leave deducts its
    /// working days from the balance of the start date's year.
    ///
    /// # Errors
    ///
    /// - `LeaveError::InvalidTransition` unless the leave is pending
    /// - `BalanceError::NotFound` if the approval has no balance to draw on
    /// - `BalanceError::InsufficientBalance` or `InsufficientSickBalance`
    pub async fn update_status(
        &self,
        id: Uuid,
        to: LeaveStatus,
    ) -> Result<StatusChange, LeaveRepoError> {
        let txn = self.db.begin().await?;

        let leave = leaves::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(LeaveRepoError::NotFound(id))?;
        let status = transition(leave.status.into(), to)?;
        let leave_type = LeaveType::from(leave.leave_type);

        let mut days = 0;
        let mut deduction = None;
        if status == LeaveStatus::Approved {
            let holidays =
                HolidayRepository::dates_between(&txn, leave.start_date, leave.end_date).await?;
            days = working_days(leave.start_date, leave.end_date, &holidays);

            if leave_type.deducts_balance() && days > 0 {
                let (_, applied) = BalanceManager::new(SeaBalanceStore::new(&txn), self.policy)
                    .deduct(leave.user_id, leave.start_date.year(), days, leave_type)
                    .await?;
                deduction = Some(applied);
            }
        }

        let mut active: leaves::ActiveModel = leave.into();
        active.status = Set(status.into());
        active.updated_at = Set(Utc::now().into());
        let leave = active.update(&txn).await?;

        txn.commit().await?;

        info!(leave_id = %id, status = %status, working_days = days, "leave status changed");
        Ok(StatusChange {
            leave,
            working_days: days,
            deduction,
        })
    }

    /// Records the stored certificate of a leave.
    ///
    /// # Errors
    ///
    /// Returns `LeaveRepoError::NotFound` for an unknown leave.
    pub async fn set_certificate(
        &self,
        id: Uuid,
        name: Option<String>,
        key: Option<String>,
    ) -> Result<leaves::Model, LeaveRepoError> {
        let leave = self.find_by_id(id).await?.ok_or(LeaveRepoError::NotFound(id))?;
        let mut active: leaves::ActiveModel = leave.into();
        active.certificate_name = Set(name);
        active.certificate_key = Set(key);
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(&self.db).await?)
    }
}
