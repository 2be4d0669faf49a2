//! In-memory tenant store.
//!
//! Stands in for the SQL-backed store in tests, development and simple
//! deployments. The public base tenant is seeded at construction so an empty
//! deployment still resolves the default identifier.

use async_trait::async_trait;
use dashmap::DashMap;
use tenant_directory_sdk::{DirectoryError, TenantIdentifier, TenantRecord};

use super::TenantStore;

pub struct MemoryStore {
    records: DashMap<TenantIdentifier, TenantRecord>,
    multi_tenancy: bool,
}

impl MemoryStore {
    /// A multi-tenancy-capable store.
    #[must_use]
    pub fn new() -> Self {
        let records = DashMap::new();
        let base = TenantRecord::base_public();
        records.insert(base.identifier.clone(), base);
        Self {
            records,
            multi_tenancy: true,
        }
    }

    /// A store that does not advertise multi-tenancy. The directory will
    /// degrade every lookup to the public default identifier.
    #[must_use]
    pub fn single_tenant() -> Self {
        let mut store = Self::new();
        store.multi_tenancy = false;
        store
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TenantStore for MemoryStore {
    fn supports_multi_tenancy(&self) -> bool {
        self.multi_tenancy
    }

    async fn fetch_tenant_record(
        &self,
        id: &TenantIdentifier,
    ) -> Result<Option<TenantRecord>, DirectoryError> {
        Ok(self.records.get(id).map(|r| r.clone()))
    }

    async fn app_exists(&self, id: &TenantIdentifier) -> Result<bool, DirectoryError> {
        let exists = self.records.iter().any(|entry| {
            let key = entry.key();
            key.connection_uri_domain() == id.connection_uri_domain()
                && key.app_id() == id.app_id()
        });
        Ok(exists)
    }

    async fn put_tenant_record(&self, record: TenantRecord) -> Result<(), DirectoryError> {
        self.records.insert(record.identifier.clone(), record);
        Ok(())
    }
}
