//! Storage collaborator contract for the tenant directory.

pub mod memory;

use async_trait::async_trait;
use tenant_directory_sdk::{DirectoryError, TenantIdentifier, TenantRecord};

/// Backing store for tenant records.
///
/// Absence is data (`Ok(None)`); infrastructure failure is
/// `DirectoryError::Storage`. Implementations may suspend on a backend round
/// trip; callers must not hold cross-request locks while awaiting.
#[async_trait]
pub trait TenantStore: Send + Sync {
    /// Whether this store supports multi-application / multi-tenant
    /// hierarchies. Stores that return `false` are used in single-tenant
    /// mode: the directory maps every identifier to the public default
    /// instead of failing.
    fn supports_multi_tenancy(&self) -> bool;

    /// Fetch the record for the exact identifier triple.
    ///
    /// # Errors
    ///
    /// - `Storage` if the backend round trip failed
    async fn fetch_tenant_record(
        &self,
        id: &TenantIdentifier,
    ) -> Result<Option<TenantRecord>, DirectoryError>;

    /// Whether any tenant record exists under the `(domain, app)` pair of
    /// `id`.
    ///
    /// # Errors
    ///
    /// - `Storage` if the backend round trip failed
    async fn app_exists(&self, id: &TenantIdentifier) -> Result<bool, DirectoryError>;

    /// Create or replace a tenant record. Only the administrative
    /// collaborator calls this; the request path never writes.
    ///
    /// # Errors
    ///
    /// - `Storage` if the backend round trip failed
    async fn put_tenant_record(&self, record: TenantRecord) -> Result<(), DirectoryError>;
}
