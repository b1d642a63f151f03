//! Holiday repository.

use std::collections::HashSet;

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use leavedesk_shared::AppError;

use crate::entities::holidays;

/// Error types for holiday operations.
#[derive(Debug, thiserror::Error)]
pub enum HolidayError {
    /// Holiday not found.
    #[error("Holiday not found: {0}")]
    NotFound(Uuid),

    /// A holiday already exists on this date.
    #[error("A holiday already exists on {0}")]
    DuplicateDate(NaiveDate),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<HolidayError> for AppError {
    fn from(err: HolidayError) -> Self {
        match err {
            HolidayError::NotFound(_) => Self::NotFound(err.to_string()),
            HolidayError::DuplicateDate(_) => Self::Conflict(err.to_string()),
            HolidayError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Holiday repository.
#[derive(Debug, Clone)]
pub struct HolidayRepository {
    db: DatabaseConnection,
}

impl HolidayRepository {
    /// Creates a new holiday repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists holidays by date, optionally restricted to one year.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, year: Option<i32>) -> Result<Vec<holidays::Model>, DbErr> {
        let mut query = holidays::Entity::find();
        if let Some(year) = year
            && let (Some(first), Some(last)) = (
                NaiveDate::from_ymd_opt(year, 1, 1),
                NaiveDate::from_ymd_opt(year, 12, 31),
            )
        {
            query = query.filter(holidays::Column::Date.between(first, last));
        }
        query
            .order_by_asc(holidays::Column::Date)
            .all(&self.db)
            .await
    }

    /// Creates a holiday.
    ///
    /// # Errors
    ///
    /// Returns `HolidayError::DuplicateDate` if the date is already a holiday.
    pub async fn create(&self, name: &str, date: NaiveDate) -> Result<holidays::Model, HolidayError> {
        let existing = holidays::Entity::find()
            .filter(holidays::Column::Date.eq(date))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(HolidayError::DuplicateDate(date));
        }

        let holiday = holidays::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name.trim().to_string()),
            date: Set(date),
        };
        Ok(holiday.insert(&self.db).await?)
    }

    /// Deletes a holiday.
    ///
    /// # Errors
    ///
    /// Returns `HolidayError::NotFound` if no holiday has this ID.
    pub async fn delete(&self, id: Uuid) -> Result<(), HolidayError> {
        let holiday = holidays::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(HolidayError::NotFound(id))?;
        holiday.delete(&self.db).await?;
        Ok(())
    }

    /// Holiday dates within `start..=end`, read through `conn` so it can join
    /// an open transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn dates_between<C: ConnectionTrait>(
        conn: &C,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HashSet<NaiveDate>, DbErr> {
        Ok(holidays::Entity::find()
            .filter(holidays::Column::Date.between(start, end))
            .all(conn)
            .await?
            .into_iter()
            .map(|h| h.date)
            .collect())
    }
}
