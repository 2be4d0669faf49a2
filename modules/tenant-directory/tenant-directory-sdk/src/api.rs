//! Public API trait for the tenant directory.
//!
//! The directory service implements this trait; the request router consumes
//! it on the hot path. Implementations must be safe for unbounded concurrent
//! readers and must not hold any cross-request lock across a backend round
//! trip.

use async_trait::async_trait;

use crate::error::DirectoryError;
use crate::models::{TenantIdentifier, TenantRecord};

/// Read-side contract of the tenant directory.
#[async_trait]
pub trait TenantDirectoryClient: Send + Sync {
    /// Look up the record for the full identifier triple.
    ///
    /// # Errors
    ///
    /// - `TenantNotFound` if no record exists for the identifier
    /// - `Storage` if the backing store failed
    async fn get_tenant(
        &self,
        id: &TenantIdentifier,
    ) -> Result<TenantRecord, DirectoryError>;

    /// Whether the application addressed by `id` exists, regardless of the
    /// tenant component. An application exists iff at least one tenant record
    /// lives under its `(connection_uri_domain, app_id)` pair.
    ///
    /// # Errors
    ///
    /// - `Storage` if the backing store failed
    async fn app_exists(&self, id: &TenantIdentifier) -> Result<bool, DirectoryError>;
}
