//! Error types for the tenant directory.

use thiserror::Error;

use crate::models::TenantIdentifier;

/// Errors that can occur when querying the tenant directory.
///
/// Absence (`TenantNotFound`) is deliberately distinct from `Storage`: a
/// transient backend failure must never be coerced into a
/// tenant-does-not-exist answer.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    /// The requested tenant does not exist.
    #[error("tenant not found: {identifier}")]
    TenantNotFound {
        /// The identifier that was not found.
        identifier: TenantIdentifier,
    },

    /// The backing store failed; the lookup result is unknown.
    #[error("storage error: {0}")]
    Storage(String),
}

impl DirectoryError {
    #[must_use]
    pub fn not_found(identifier: TenantIdentifier) -> Self {
        Self::TenantNotFound { identifier }
    }
}
