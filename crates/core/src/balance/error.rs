//! Leave balance error types.

use thiserror::Error;
use uuid::Uuid;

use leavedesk_shared::AppError;

/// Leave balance errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BalanceError {
    /// No balance for this user and year.
    #[error("balance not found for user {user_id} in {year}")]
    NotFound {
        /// User ID.
        user_id: Uuid,
        /// Calendar year.
        year: i32,
    },

    /// No balance with this ID.
    #[error("balance not found: {0}")]
    NotFoundById(Uuid),

    /// A balance for this user and year already exists.
    #[error("balance already exists for user {user_id} in {year}")]
    AlreadyExists {
        /// User ID.
        user_id: Uuid,
        /// Calendar year.
        year: i32,
    },

    /// Paid deduction larger than remaining plus carried-over days.
    #[error("insufficient balance: requested {requested} days, {available} available")]
    InsufficientBalance {
        /// Requested days.
        requested: i32,
        /// Paid days available.
        available: i32,
    },

    /// Sick deduction larger than the sick pool.
    #[error("insufficient sick balance: requested {requested} days, {available} available")]
    InsufficientSickBalance {
        /// Requested days.
        requested: i32,
        /// Sick days available.
        available: i32,
    },

    /// Carry-over larger than this year's remaining paid days.
    #[error("cannot carry over {requested} days, only {remaining} remaining")]
    CarryOverExceedsRemaining {
        /// Requested days.
        requested: i32,
        /// Remaining paid days, excluding carried-in days.
        remaining: i32,
    },

    /// Day counts must not be negative.
    #[error("day count must not be negative: {0}")]
    NegativeDays(i32),

    /// The year has no neighbour in range.
    #[error("year out of range: {0}")]
    YearOutOfRange(i32),

    /// Months worked must not be negative.
    #[error("months worked must not be negative: {0}")]
    NegativeMonths(i32),

    /// Persistence failed.
    #[error("balance store error: {0}")]
    Store(String),
}

impl BalanceError {
    /// Create a store error.
    #[must_use]
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}

impl From<BalanceError> for AppError {
    fn from(err: BalanceError) -> Self {
        match err {
            BalanceError::NotFound { .. } | BalanceError::NotFoundById(_) => {
                Self::NotFound(err.to_string())
            }
            BalanceError::AlreadyExists { .. } => Self::Conflict(err.to_string()),
            BalanceError::InsufficientBalance { .. }
            | BalanceError::InsufficientSickBalance { .. }
            | BalanceError::CarryOverExceedsRemaining { .. } => {
                Self::InsufficientBalance(err.to_string())
            }
            BalanceError::NegativeDays(_)
            | BalanceError::NegativeMonths(_)
            | BalanceError::YearOutOfRange(_) => Self::Validation(err.to_string()),
            BalanceError::Store(msg) => Self::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_mapping() {
        let user_id = Uuid::nil();
        let not_found: AppError = BalanceError::NotFound { user_id, year: 2024 }.into();
        assert_eq!(not_found.status_code(), 404);

        let exists: AppError = BalanceError::AlreadyExists { user_id, year: 2024 }.into();
        assert_eq!(exists.status_code(), 409);

        let short: AppError = BalanceError::InsufficientBalance {
            requested: 5,
            available: 2,
        }
        .into();
        assert_eq!(short.error_code(), "INSUFFICIENT_BALANCE");

        let negative: AppError = BalanceError::NegativeDays(-1).into();
        assert_eq!(negative.status_code(), 400);

        let year: AppError = BalanceError::YearOutOfRange(i32::MAX).into();
        assert_eq!(year.status_code(), 400);

        let store: AppError = BalanceError::store("boom").into();
        assert_eq!(store.to_string(), "Database error: boom");
    }

    #[test]
    fn test_messages() {
        let err = BalanceError::InsufficientSickBalance {
            requested: 4,
            available: 1,
        };
        assert_eq!(
            err.to_string(),
            "insufficient sick balance: requested 4 days, 1 available"
        );
    }
}
