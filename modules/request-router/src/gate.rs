//! Allow/deny decisions for matched routes.

use std::sync::Arc;

use http::Method;
use tenant_directory_sdk::{DirectoryError, TenantDirectoryClient, TenantIdentifier, TenantRecord};

use crate::path::ParsedPath;
use crate::routes::{RouteSpec, RouteTable, ShapeRule};

/// Outcome of gating one request.
#[derive(Debug)]
pub enum GateDecision<'t> {
    Allow(&'t RouteSpec),
    NotFound,
    Forbidden,
}

/// Combines the parsed address, the directory and the per-route policy into
/// an allow/deny decision.
///
/// The decision function is reentrant and side-effect-free; the only
/// suspension point is the directory lookup, and no lock is held across it.
pub struct RouteGate {
    directory: Arc<dyn TenantDirectoryClient>,
    api_keys: Vec<String>,
}

impl RouteGate {
    #[must_use]
    pub fn new(directory: Arc<dyn TenantDirectoryClient>, api_keys: Vec<String>) -> Self {
        Self {
            directory,
            api_keys,
        }
    }

    /// Decision policy, evaluated in order: route match, shape policy,
    /// tenant/application existence, API key, capability.
    ///
    /// # Errors
    ///
    /// Propagates `DirectoryError::Storage` (infrastructure failure is never
    /// coerced into a routing decision). `TenantNotFound` is consumed here
    /// and becomes a `NotFound` decision.
    pub async fn decide<'t>(
        &self,
        table: &'t RouteTable,
        parsed: &ParsedPath,
        identifier: &TenantIdentifier,
        method: &Method,
        api_key: Option<&str>,
    ) -> Result<GateDecision<'t>, DirectoryError> {
        let Some(route) = table.match_route(method, &parsed.residual) else {
            return Ok(GateDecision::NotFound);
        };

        match route.shape_policy.rule_for(parsed.shape()) {
            ShapeRule::Hide => return Ok(GateDecision::NotFound),
            ShapeRule::Forbid => return Ok(GateDecision::Forbidden),
            ShapeRule::Allow => {}
        }

        let mut record = None;
        if route.requires_tenant_to_exist {
            if parsed.app_id.is_some() && !self.directory.app_exists(identifier).await? {
                return Ok(GateDecision::NotFound);
            }
            match self.lookup(identifier).await? {
                Some(found) => record = Some(found),
                None => return Ok(GateDecision::NotFound),
            }
        }

        if !self.api_keys.is_empty() && !route.bypasses_api_key {
            let valid = api_key.is_some_and(|k| self.api_keys.iter().any(|known| known == k));
            if !valid {
                return Ok(GateDecision::Forbidden);
            }
        }

        if let Some(capability) = route.required_capability {
            let record = match record {
                Some(found) => found,
                None => match self.lookup(identifier).await? {
                    Some(found) => found,
                    None => return Ok(GateDecision::NotFound),
                },
            };
            if !record.has_capability(capability) {
                return Ok(GateDecision::Forbidden);
            }
        }

        Ok(GateDecision::Allow(route))
    }

    /// Absence as `None`; storage failures stay errors.
    async fn lookup(
        &self,
        identifier: &TenantIdentifier,
    ) -> Result<Option<TenantRecord>, DirectoryError> {
        match self.directory.get_tenant(identifier).await {
            Ok(record) => Ok(Some(record)),
            Err(DirectoryError::TenantNotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use std::collections::BTreeSet;

    use tenant_directory::{CachedDirectory, MemoryStore};
    use tenant_directory_sdk::{Capability, TenantRecord};

    use super::*;
    use crate::path::{AddressShape, PathResolver};
    use crate::routes::RouteTarget;

    async fn seeded_gate(api_keys: Vec<String>) -> (RouteGate, RouteTable) {
        let directory = CachedDirectory::new(Arc::new(MemoryStore::new()));
        directory
            .create_or_update_tenant(TenantRecord::new(
                TenantIdentifier::new(None, Some("hello"), None),
                Capability::ALL.into_iter().collect(),
            ))
            .await
            .unwrap();
        directory
            .create_or_update_tenant(TenantRecord::new(
                TenantIdentifier::new(None, Some("hello"), Some("nopw")),
                [Capability::ThirdParty].into_iter().collect::<BTreeSet<_>>(),
            ))
            .await
            .unwrap();
        let table = RouteTable::standard().unwrap();
        (RouteGate::new(Arc::new(directory), api_keys), table)
    }

    fn parse(path: &str, table: &RouteTable) -> ParsedPath {
        PathResolver::new("", table.reserved_segments())
            .unwrap()
            .resolve(path)
            .unwrap()
    }

    #[tokio::test]
    async fn probe_allows_nonexistent_tenant() {
        let (gate, table) = seeded_gate(vec![]).await;
        let parsed = parse("/ghost/hello", &table);
        assert_eq!(parsed.shape(), AddressShape::TenantOnly);
        let identifier = TenantIdentifier::new(None, None, parsed.tenant_id.as_deref());
        let decision = gate
            .decide(&table, &parsed, &identifier, &Method::GET, None)
            .await
            .unwrap();
        assert!(matches!(
            decision,
            GateDecision::Allow(route) if route.target == RouteTarget::Hello
        ));
    }

    #[tokio::test]
    async fn signup_requires_existing_tenant() {
        let (gate, table) = seeded_gate(vec![]).await;
        let parsed = parse("/appid-hello/ghost/recipe/signup", &table);
        let identifier = TenantIdentifier::new(None, Some("hello"), Some("ghost"));
        let decision = gate
            .decide(&table, &parsed, &identifier, &Method::POST, None)
            .await
            .unwrap();
        assert!(matches!(decision, GateDecision::NotFound));
    }

    #[tokio::test]
    async fn signup_without_capability_is_forbidden() {
        let (gate, table) = seeded_gate(vec![]).await;
        let parsed = parse("/appid-hello/nopw/recipe/signup", &table);
        let identifier = TenantIdentifier::new(None, Some("hello"), Some("nopw"));
        let decision = gate
            .decide(&table, &parsed, &identifier, &Method::POST, None)
            .await
            .unwrap();
        assert!(matches!(decision, GateDecision::Forbidden));
    }

    #[tokio::test]
    async fn api_keys_gate_signup_but_not_probe() {
        let (gate, table) = seeded_gate(vec!["sekret".to_owned()]).await;

        let probe = parse("/hello", &table);
        let decision = gate
            .decide(&table, &probe, &TenantIdentifier::base(), &Method::GET, None)
            .await
            .unwrap();
        assert!(matches!(decision, GateDecision::Allow(_)));

        let signup = parse("/appid-hello/recipe/signup", &table);
        let identifier = TenantIdentifier::new(None, Some("hello"), None);
        let denied = gate
            .decide(&table, &signup, &identifier, &Method::POST, Some("wrong"))
            .await
            .unwrap();
        assert!(matches!(denied, GateDecision::Forbidden));

        let allowed = gate
            .decide(&table, &signup, &identifier, &Method::POST, Some("sekret"))
            .await
            .unwrap();
        assert!(matches!(allowed, GateDecision::Allow(_)));
    }
}
