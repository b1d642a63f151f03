//! Certificate storage using Apache OpenDAL.
//!
//! Two backends are wired up: S3-compatible object storage and the local
//! filesystem. Objects are written and read through the service rather than
//! presigned URLs, so the API can attach a `Content-Disposition` header.

mod config;
mod error;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::{ObjectMetadata, StorageService};
