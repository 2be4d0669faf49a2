//! Read-through cached directory over a [`TenantStore`].

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tenant_directory_sdk::{
    DirectoryError, TenantDirectoryClient, TenantIdentifier, TenantRecord,
};

use crate::backend::TenantStore;

/// The tenant directory service.
///
/// Reads go through an in-process cache keyed by the full identifier triple;
/// misses fall through to the store. Administrative writes are write-through
/// (store first, then cache), so subsequent reads observe them; a record
/// fetched on a miss never displaces a cache entry installed by a concurrent
/// write. Negative results are not cached: a tenant created after a miss is
/// visible on the next lookup.
pub struct CachedDirectory {
    store: Arc<dyn TenantStore>,
    cache: DashMap<TenantIdentifier, TenantRecord>,
    multi_tenancy: bool,
}

impl CachedDirectory {
    #[must_use]
    pub fn new(store: Arc<dyn TenantStore>) -> Self {
        let multi_tenancy = store.supports_multi_tenancy();
        if !multi_tenancy {
            tracing::info!("tenant store lacks multi-tenancy; degrading to single-tenant mode");
        }
        Self {
            store,
            cache: DashMap::new(),
            multi_tenancy,
        }
    }

    /// Create or update a tenant record (administrative collaborator, never
    /// the request path).
    ///
    /// # Errors
    ///
    /// - `Storage` if the backend write failed
    pub async fn create_or_update_tenant(
        &self,
        record: TenantRecord,
    ) -> Result<(), DirectoryError> {
        let record = if self.multi_tenancy {
            record
        } else {
            // Single-tenant mode folds every write into the public default.
            TenantRecord {
                identifier: TenantIdentifier::base(),
                ..record
            }
        };
        tracing::debug!(identifier = %record.identifier, "create_or_update_tenant");
        self.store.put_tenant_record(record.clone()).await?;
        self.cache.insert(record.identifier.clone(), record);
        Ok(())
    }

    fn effective_id(&self, id: &TenantIdentifier) -> TenantIdentifier {
        if self.multi_tenancy {
            id.clone()
        } else {
            TenantIdentifier::base()
        }
    }
}

#[async_trait]
impl TenantDirectoryClient for CachedDirectory {
    async fn get_tenant(
        &self,
        id: &TenantIdentifier,
    ) -> Result<TenantRecord, DirectoryError> {
        let key = self.effective_id(id);

        // Guard is dropped before the store await below.
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit.clone());
        }

        match self.store.fetch_tenant_record(&key).await? {
            Some(record) => {
                // An admin write may land while the fetch is in flight; the
                // fetched record must not replace an entry installed by it.
                let entry = self.cache.entry(key).or_insert(record);
                Ok(entry.value().clone())
            }
            None => Err(DirectoryError::not_found(key)),
        }
    }

    async fn app_exists(&self, id: &TenantIdentifier) -> Result<bool, DirectoryError> {
        let key = self.effective_id(id);
        // The public app always exists (base tenant is seeded).
        if key.is_default_app() {
            return Ok(true);
        }
        self.store.app_exists(&key).await
    }
}
