//! Certificate error types.

use thiserror::Error;
use uuid::Uuid;

use leavedesk_shared::AppError;

use crate::storage::StorageError;

/// Certificate operation errors.
#[derive(Debug, Error)]
pub enum CertificateError {
    /// The leave has no certificate attached.
    #[error("leave {0} has no certificate")]
    Missing(Uuid),

    /// Reading the stored certificate failed.
    #[error("failed to download certificate for leave {leave_id}: {source}")]
    DownloadFailed {
        /// Leave the certificate belongs to.
        leave_id: Uuid,
        /// Underlying storage failure.
        #[source]
        source: StorageError,
    },

    /// Upload validation or write failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<CertificateError> for AppError {
    fn from(err: CertificateError) -> Self {
        match err {
            CertificateError::Missing(_) => Self::NotFound(err.to_string()),
            CertificateError::DownloadFailed {
                source: StorageError::NotFound { .. },
                ..
            } => Self::NotFound(err.to_string()),
            CertificateError::DownloadFailed { .. } => Self::Storage(err.to_string()),
            CertificateError::Storage(source) => source.into(),
        }
    }
}
