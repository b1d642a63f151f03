//! Certificate upload and download on top of `StorageService`.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use super::disposition::content_disposition;
use super::error::CertificateError;
use crate::storage::StorageService;

/// Where an uploaded certificate ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCertificate {
    /// Storage key, `certificates/{leave_id}/{sanitized_name}`.
    pub key: String,
    /// Name as uploaded, kept for the download header.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Key of the certificate this upload replaces, if any.
    pub previous_key: Option<String>,
}

impl StoredCertificate {
    /// The previous object once the new key is recorded, unless it was overwritten in place.
    fn replaced_key(&self) -> Option<&str> {
        self.previous_key
            .as_deref()
            .filter(|previous| *previous != self.key)
    }
}

/// A certificate ready to be sent to a client.
#[derive(Debug, Clone)]
pub struct CertificateDownload {
    /// File content.
    pub data: Bytes,
    /// MIME type derived from the file name.
    pub content_type: &'static str,
    /// `Content-Disposition` header value.
    pub content_disposition: String,
}

/// Stores medical certificates attached to leaves.
pub struct CertificateService {
    storage: Arc<StorageService>,
}

impl CertificateService {
    /// Create a new certificate service.
    #[must_use]
    pub const fn new(storage: Arc<StorageService>) -> Self {
        Self { storage }
    }

    /// Store a certificate for `leave_id`.
    ///
    /// The previous certificate stays in place. Once the new key is recorded
    /// call `commit` to remove it, or `rollback` to drop the new object.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File size exceeds the configured limit
    /// - MIME type is not allowed
    /// - The storage write fails
    pub async fn upload(
        &self,
        leave_id: Uuid,
        filename: &str,
        content_type: &str,
        data: Bytes,
        previous_key: Option<&str>,
    ) -> Result<StoredCertificate, CertificateError> {
        let size = u64::try_from(data.len()).unwrap_or(u64::MAX);
        self.storage.validate_upload(content_type, size)?;

        let key = StorageService::certificate_key(leave_id, filename);
        self.storage.write(&key, data).await?;

        info!(%leave_id, %key, size, "certificate stored");
        Ok(StoredCertificate {
            key,
            name: filename.to_string(),
            size,
            previous_key: previous_key.map(str::to_string),
        })
    }

    /// Removes the certificate `stored` replaced. Failures are logged.
    pub async fn commit(&self, leave_id: Uuid, stored: &StoredCertificate) {
        if let Some(previous) = stored.replaced_key()
            && let Err(e) = self.storage.delete(previous).await
        {
            warn!(%leave_id, key = previous, error = %e, "failed to remove replaced certificate");
        }
    }

    /// Removes a new upload whose key could not be recorded.
    ///
    /// An upload written over the previous key is left alone, since the
    /// record still points at it. Failures are logged.
    pub async fn rollback(&self, leave_id: Uuid, stored: &StoredCertificate) {
        if stored.previous_key.as_deref() == Some(stored.key.as_str()) {
            return;
        }
        if let Err(e) = self.storage.delete(&stored.key).await {
            warn!(%leave_id, key = %stored.key, error = %e, "failed to remove orphaned certificate");
        }
    }

    /// Load a leave's certificate.
    ///
    /// # Errors
    ///
    /// Returns `CertificateError::Missing` when `key` is `None` and
    /// `CertificateError::DownloadFailed` when the read fails.
    pub async fn download(
        &self,
        leave_id: Uuid,
        key: Option<&str>,
        name: Option<&str>,
    ) -> Result<CertificateDownload, CertificateError> {
        let key = key.ok_or(CertificateError::Missing(leave_id))?;
        let data = self
            .storage
            .read(key)
            .await
            .map_err(|source| CertificateError::DownloadFailed { leave_id, source })?;

        let name = name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| key.rsplit('/').next().unwrap_or(key));

        Ok(CertificateDownload {
            data,
            content_type: content_type_for(name),
            content_disposition: content_disposition(name),
        })
    }

    /// Remove a stored certificate. Missing objects are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub async fn remove(&self, key: &str) -> Result<(), CertificateError> {
        self.storage.delete(key).await?;
        Ok(())
    }
}

/// MIME type for a certificate file name.
#[must_use]
pub fn content_type_for(filename: &str) -> &'static str {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
