//! Permission (short absence) repository.

use chrono::{NaiveDate, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::info;
use uuid::Uuid;

use leavedesk_core::leave::workflow::{ensure_editable, transition};
use leavedesk_core::leave::{LeaveError, LeaveStatus};
use leavedesk_core::permission::validate_time_range;
use leavedesk_shared::AppError;
use leavedesk_shared::types::PageRequest;

use crate::entities::permissions;
use crate::entities::sea_orm_active_enums::RequestStatus;

/// Error types for permission operations.
#[derive(Debug, thiserror::Error)]
pub enum PermissionError {
    /// Permission not found.
    #[error("Permission not found: {0}")]
    NotFound(Uuid),

    /// Time range or workflow rule violated.
    #[error(transparent)]
    Rule(#[from] LeaveError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<PermissionError> for AppError {
    fn from(err: PermissionError) -> Self {
        match err {
            PermissionError::NotFound(_) => Self::NotFound(err.to_string()),
            PermissionError::Rule(e) => e.into(),
            PermissionError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Filters for listing permissions.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionFilter {
    /// Only this user's permissions.
    pub user_id: Option<Uuid>,
    /// Only this status.
    pub status: Option<LeaveStatus>,
}

/// Input for creating a permission.
#[derive(Debug, Clone)]
pub struct CreatePermissionInput {
    /// Owner.
    pub user_id: Uuid,
    /// Day of the absence.
    pub date: NaiveDate,
    /// Start of the absence.
    pub start_time: NaiveTime,
    /// End of the absence.
    pub end_time: NaiveTime,
    /// Free-text reason.
    pub reason: Option<String>,
}

/// Input for editing a pending permission.
#[derive(Debug, Clone, Default)]
pub struct UpdatePermissionInput {
    /// New day.
    pub date: Option<NaiveDate>,
    /// New start.
    pub start_time: Option<NaiveTime>,
    /// New end.
    pub end_time: Option<NaiveTime>,
    /// New reason.
    pub reason: Option<String>,
}

/// Permission repository.
#[derive(Debug, Clone)]
pub struct PermissionRepository {
    db: DatabaseConnection,
}

impl PermissionRepository {
    /// Creates a new permission repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a permission by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<permissions::Model>, DbErr> {
        permissions::Entity::find_by_id(id).one(&self.db).await
    }

    /// Lists permissions, latest day first, with the total match count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: PermissionFilter,
        page: PageRequest,
    ) -> Result<(Vec<permissions::Model>, u64), DbErr> {
        let mut query = permissions::Entity::find();
        if let Some(user_id) = filter.user_id {
            query = query.filter(permissions::Column::UserId.eq(user_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(permissions::Column::Status.eq(RequestStatus::from(status)));
        }

        let total = query.clone().count(&self.db).await?;
        let items = query
            .order_by_desc(permissions::Column::Date)
            .order_by_asc(permissions::Column::StartTime)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((items, total))
    }

    /// Files a pending permission.
    ///
    /// # Errors
    ///
    /// Returns `LeaveError::InvalidTimeRange` unless the end is after the start.
    pub async fn create(
        &self,
        input: CreatePermissionInput,
    ) -> Result<permissions::Model, PermissionError> {
        validate_time_range(input.start_time, input.end_time)?;

        let permission = permissions::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(input.user_id),
            date: Set(input.date),
            start_time: Set(input.start_time),
            end_time: Set(input.end_time),
            reason: Set(input.reason),
            status: Set(LeaveStatus::Pending.into()),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await?;

        info!(permission_id = %permission.id, user_id = %permission.user_id, "permission filed");
        Ok(permission)
    }

    /// Edits a pending permission.
    ///
    /// # Errors
    ///
    /// Returns `LeaveError::NotEditable` once decided, and
    /// `LeaveError::InvalidTimeRange` for an empty or inverted merged range.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdatePermissionInput,
    ) -> Result<permissions::Model, PermissionError> {
        let permission = self
            .find_by_id(id)
            .await?
            .ok_or(PermissionError::NotFound(id))?;
        ensure_editable(permission.status.into())?;

        let start_time = input.start_time.unwrap_or(permission.start_time);
        let end_time = input.end_time.unwrap_or(permission.end_time);
        validate_time_range(start_time, end_time)?;

        let mut active: permissions::ActiveModel = permission.into();
        active.start_time = Set(start_time);
        active.end_time = Set(end_time);
        if let Some(date) = input.date {
            active.date = Set(date);
        }
        if let Some(reason) = input.reason {
            active.reason = Set(Some(reason));
        }

        Ok(active.update(&self.db).await?)
    }

    /// Deletes a permission. Without `force`, only pending ones may go.
    ///
    /// # Errors
    ///
    /// Returns `LeaveError::NotEditable` for a decided permission when `force` is false.
    pub async fn delete(&self, id: Uuid, force: bool) -> Result<(), PermissionError> {
        let permission = self
            .find_by_id(id)
            .await?
            .ok_or(PermissionError::NotFound(id))?;
        if !force {
            ensure_editable(permission.status.into())?;
        }
        permission.delete(&self.db).await?;
        info!(permission_id = %id, "permission deleted");
        Ok(())
    }

    /// Approves or rejects a pending permission.
    ///
    /// # Errors
    ///
    /// Returns `LeaveError::InvalidTransition` unless the permission is pending.
    pub async fn update_status(
        &self,
        id: Uuid,
        to: LeaveStatus,
    ) -> Result<permissions::Model, PermissionError> {
        let permission = self
            .find_by_id(id)
            .await?
            .ok_or(PermissionError::NotFound(id))?;
        let status = transition(permission.status.into(), to)?;

        let mut active: permissions::ActiveModel = permission.into();
        active.status = Set(status.into());
        let permission = active.update(&self.db).await?;

        info!(permission_id = %id, status = %status, "permission status changed");
        Ok(permission)
    }
}
