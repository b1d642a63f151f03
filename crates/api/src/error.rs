//! HTTP error responses.
//!
//! Every handler error becomes an `AppError` and is rendered as
//! `{"error": CODE, "message": text}` with the matching status code.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde_json::json;
use tracing::error;

use leavedesk_core::auth::PasswordError;
use leavedesk_core::balance::BalanceError;
use leavedesk_core::certificate::CertificateError;
use leavedesk_core::leave::LeaveError;
use leavedesk_core::storage::StorageError;
use leavedesk_db::repositories::{HolidayError, LeaveRepoError, PermissionError, UserError};
use leavedesk_shared::{AppError, JwtError};

/// Error returned by handlers.
#[derive(Debug)]
pub struct ApiError(pub AppError);

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// 400 with a message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self(AppError::Validation(message.into()))
    }

    /// 401 with a message.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self(AppError::Unauthorized(message.into()))
    }

    /// 403 with a message.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self(AppError::Forbidden(message.into()))
    }

    /// 404 for a resource kind and ID.
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        Self(AppError::not_found(resource, id))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = match &err {
            AppError::Database(_) | AppError::Internal(_) => {
                error!(error = %err, "request failed");
                "An internal error occurred".to_string()
            }
            AppError::Storage(_) => {
                error!(error = %err, "storage failure");
                err.to_string()
            }
            _ => err.to_string(),
        };

        (
            status,
            Json(json!({
                "error": err.error_code(),
                "message": message,
            })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self(AppError::Database(err.to_string()))
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => Self::unauthorized("Token has expired"),
            JwtError::DecodingError(_) => Self::unauthorized("Invalid or malformed token"),
            JwtError::EncodingError(e) => Self(AppError::Internal(e)),
        }
    }
}

macro_rules! via_app_error {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for ApiError {
                fn from(err: $source) -> Self {
                    Self(err.into())
                }
            }
        )*
    };
}

via_app_error!(
    BalanceError,
    LeaveError,
    StorageError,
    CertificateError,
    PasswordError,
    UserError,
    LeaveRepoError,
    PermissionError,
    HolidayError,
);
