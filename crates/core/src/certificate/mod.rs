//! Medical certificates attached to leaves.

pub mod disposition;
mod error;
mod service;

pub use disposition::{content_disposition, filename_from_content_disposition};
pub use error::CertificateError;
pub use service::{CertificateDownload, CertificateService, StoredCertificate, content_type_for};
