//! Static route catalog.
//!
//! Each registrable API is described by a [`RouteSpec`]: a residual path
//! template, gating flags (API key, tenant existence, required capability)
//! and a per-address-shape policy. The table is immutable after process
//! start; the residual-path match uses `matchit` routers, one per method.

use std::collections::{HashMap, HashSet};

use http::Method;
use tenant_directory_sdk::Capability;
use thiserror::Error;

use crate::path::AddressShape;
use crate::throttle::ThrottleKey;

/// Handler target handed to the business layer on `Allow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    /// The liveness/health probe.
    Hello,
    /// Email-password sign-up.
    SignUp,
}

/// How a route behaves when addressed at a given shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapeRule {
    /// The route is reachable at this shape.
    #[default]
    Allow,
    /// The route exists but is not permitted at this shape (403).
    Forbid,
    /// The route does not exist at this shape (404).
    Hide,
}

/// Per-shape reachability policy.
///
/// This is where "route exists in general but not for this address" (403) is
/// distinguished from "no such route at all" (404); the rule is data on the
/// route spec, not hard-coded in the gate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapePolicy {
    pub public: ShapeRule,
    pub tenant_only: ShapeRule,
    pub app_only: ShapeRule,
    pub app_and_tenant: ShapeRule,
}

impl ShapePolicy {
    #[must_use]
    pub fn rule_for(&self, shape: AddressShape) -> ShapeRule {
        match shape {
            AddressShape::Public => self.public,
            AddressShape::TenantOnly => self.tenant_only,
            AddressShape::AppOnly => self.app_only,
            AddressShape::AppAndTenant => self.app_and_tenant,
        }
    }
}

/// One registrable API.
#[derive(Debug, Clone)]
pub struct RouteSpec {
    pub method: Method,
    pub path: String,
    pub target: RouteTarget,
    pub bypasses_api_key: bool,
    pub requires_tenant_to_exist: bool,
    pub required_capability: Option<Capability>,
    pub shape_policy: ShapePolicy,
}

impl RouteSpec {
    #[must_use]
    pub fn new(method: Method, path: &str, target: RouteTarget) -> Self {
        Self {
            method,
            path: path.to_owned(),
            target,
            bypasses_api_key: false,
            requires_tenant_to_exist: false,
            required_capability: None,
            shape_policy: ShapePolicy::default(),
        }
    }

    #[must_use]
    pub fn bypass_api_key(mut self) -> Self {
        self.bypasses_api_key = true;
        self
    }

    #[must_use]
    pub fn require_existing_tenant(mut self) -> Self {
        self.requires_tenant_to_exist = true;
        self
    }

    #[must_use]
    pub fn require_capability(mut self, capability: Capability) -> Self {
        self.required_capability = Some(capability);
        self
    }

    #[must_use]
    pub fn shape_rule(mut self, shape: AddressShape, rule: ShapeRule) -> Self {
        match shape {
            AddressShape::Public => self.shape_policy.public = rule,
            AddressShape::TenantOnly => self.shape_policy.tenant_only = rule,
            AddressShape::AppOnly => self.shape_policy.app_only = rule,
            AddressShape::AppAndTenant => self.shape_policy.app_and_tenant = rule,
        }
        self
    }

    /// Whether the route carries any gating at all. Ungated routes share the
    /// global throttle key.
    #[must_use]
    pub fn is_gated(&self) -> bool {
        !self.bypasses_api_key || self.required_capability.is_some()
    }
}

#[derive(Debug, Error)]
pub enum RouteTableError {
    #[error("conflicting route registration for {path:?}: {source}")]
    Conflict {
        path: String,
        #[source]
        source: matchit::InsertError,
    },
}

/// Process-wide route table.
pub struct RouteTable {
    specs: Vec<RouteSpec>,
    by_method: HashMap<Method, matchit::Router<usize>>,
}

impl RouteTable {
    /// # Errors
    ///
    /// Returns `RouteTableError::Conflict` when two specs register the same
    /// method and path template.
    pub fn new(specs: Vec<RouteSpec>) -> Result<Self, RouteTableError> {
        let mut by_method: HashMap<Method, matchit::Router<usize>> = HashMap::new();
        for (index, spec) in specs.iter().enumerate() {
            by_method
                .entry(spec.method.clone())
                .or_default()
                .insert(&spec.path, index)
                .map_err(|source| RouteTableError::Conflict {
                    path: spec.path.clone(),
                    source,
                })?;
        }
        Ok(Self { specs, by_method })
    }

    /// The standard catalog: the two probe routes plus email-password
    /// sign-up.
    ///
    /// # Errors
    ///
    /// Returns `RouteTableError::Conflict` only if the catalog itself is
    /// inconsistent.
    pub fn standard() -> Result<Self, RouteTableError> {
        Self::new(vec![
            // The probe never checks API keys, tenant existence or
            // capabilities; its shape policy alone decides 404 vs 403 for
            // app-qualified addresses.
            RouteSpec::new(Method::GET, "/", RouteTarget::Hello)
                .bypass_api_key()
                .shape_rule(AddressShape::AppOnly, ShapeRule::Hide)
                .shape_rule(AddressShape::AppAndTenant, ShapeRule::Forbid),
            RouteSpec::new(Method::GET, "/hello", RouteTarget::Hello)
                .bypass_api_key()
                .shape_rule(AddressShape::AppAndTenant, ShapeRule::Forbid),
            RouteSpec::new(Method::POST, "/recipe/signup", RouteTarget::SignUp)
                .require_existing_tenant()
                .require_capability(Capability::EmailPassword),
        ])
    }

    #[must_use]
    pub fn match_route(&self, method: &Method, residual: &str) -> Option<&RouteSpec> {
        let router = self.by_method.get(method)?;
        let matched = router.at(residual).ok()?;
        Some(&self.specs[*matched.value])
    }

    /// Throttle key for a request: per-route for gated routes, global for
    /// probes and unmatched paths.
    #[must_use]
    pub fn throttle_key(&self, method: &Method, residual: &str) -> ThrottleKey {
        match self.match_route(method, residual) {
            Some(spec) if spec.is_gated() => {
                ThrottleKey::Route(spec.method.clone(), spec.path.clone())
            }
            _ => ThrottleKey::Global,
        }
    }

    /// First segments of all registered templates; the parser must not
    /// consume these as tenant ids.
    #[must_use]
    pub fn reserved_segments(&self) -> HashSet<String> {
        self.specs
            .iter()
            .filter_map(|spec| {
                spec.path
                    .split('/')
                    .find(|s| !s.is_empty())
                    .map(str::to_owned)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn standard_catalog_matches_and_reserves() {
        let table = RouteTable::standard().unwrap();
        assert_eq!(
            table.match_route(&Method::GET, "/").unwrap().target,
            RouteTarget::Hello
        );
        assert_eq!(
            table.match_route(&Method::GET, "/hello").unwrap().target,
            RouteTarget::Hello
        );
        assert_eq!(
            table
                .match_route(&Method::POST, "/recipe/signup")
                .unwrap()
                .target,
            RouteTarget::SignUp
        );
        // Method mismatch is no match.
        assert!(table.match_route(&Method::GET, "/recipe/signup").is_none());
        assert!(table.match_route(&Method::GET, "/nothing").is_none());

        let reserved = table.reserved_segments();
        assert!(reserved.contains("hello"));
        assert!(reserved.contains("recipe"));
        assert_eq!(reserved.len(), 2);
    }

    #[test]
    fn probe_shape_policy() {
        let table = RouteTable::standard().unwrap();
        let root = table.match_route(&Method::GET, "/").unwrap();
        assert_eq!(root.shape_policy.rule_for(AddressShape::Public), ShapeRule::Allow);
        assert_eq!(root.shape_policy.rule_for(AddressShape::TenantOnly), ShapeRule::Allow);
        assert_eq!(root.shape_policy.rule_for(AddressShape::AppOnly), ShapeRule::Hide);
        assert_eq!(
            root.shape_policy.rule_for(AddressShape::AppAndTenant),
            ShapeRule::Forbid
        );
    }

    #[test]
    fn duplicate_registration_conflicts() {
        let result = RouteTable::new(vec![
            RouteSpec::new(Method::GET, "/hello", RouteTarget::Hello),
            RouteSpec::new(Method::GET, "/hello", RouteTarget::Hello),
        ]);
        assert!(matches!(result, Err(RouteTableError::Conflict { .. })));
    }

    #[test]
    fn throttle_keys_split_gated_from_probe() {
        let table = RouteTable::standard().unwrap();
        assert_eq!(table.throttle_key(&Method::GET, "/hello"), ThrottleKey::Global);
        assert_eq!(table.throttle_key(&Method::GET, "/unmatched"), ThrottleKey::Global);
        assert_eq!(
            table.throttle_key(&Method::POST, "/recipe/signup"),
            ThrottleKey::Route(Method::POST, "/recipe/signup".to_owned())
        );
    }
}
