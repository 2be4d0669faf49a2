//! Per-request orchestration: parse, throttle, gate.

use std::sync::Arc;

use http::Method;
use tenant_directory_sdk::{DirectoryError, TenantDirectoryClient, TenantIdentifier};
use thiserror::Error;

use crate::gate::{GateDecision, RouteGate};
use crate::path::{InvalidBasePath, PathResolver};
use crate::routes::{RouteTable, RouteTarget};
use crate::throttle::RequestThrottle;

/// Final decision for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Dispatch to the business layer with this handler target.
    Allow(RouteTarget),
    NotFound,
    Forbidden,
    Throttled,
}

/// Ephemeral per-request resolution result.
#[derive(Debug, Clone)]
pub struct ResolvedRequest {
    pub identifier: TenantIdentifier,
    pub residual: String,
    pub outcome: RouteOutcome,
}

/// Non-decision failures of the router itself. Routing decisions (including
/// "no such tenant") are data in [`RouteOutcome`], never errors.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The directory's backing store failed; surfaced as an internal error,
    /// never as a not-found decision.
    #[error("tenant directory failure: {0}")]
    Storage(DirectoryError),
}

#[derive(Debug, Error)]
pub enum DispatcherConfigError {
    #[error(transparent)]
    BasePath(#[from] InvalidBasePath),
}

/// Orchestrates the hot path. Resolution is a pure function of the request
/// plus the directory snapshot (the throttle counter is the only shared
/// mutable state), so an abandoned request needs no cleanup.
pub struct Dispatcher {
    resolver: PathResolver,
    table: Arc<RouteTable>,
    throttle: Arc<RequestThrottle>,
    gate: RouteGate,
}

impl Dispatcher {
    /// # Errors
    ///
    /// Returns `DispatcherConfigError` when `base_path` is malformed.
    pub fn new(
        base_path: &str,
        table: Arc<RouteTable>,
        throttle: Arc<RequestThrottle>,
        directory: Arc<dyn TenantDirectoryClient>,
        api_keys: Vec<String>,
    ) -> Result<Self, DispatcherConfigError> {
        let resolver = PathResolver::new(base_path, table.reserved_segments())?;
        Ok(Self {
            resolver,
            table,
            throttle,
            gate: RouteGate::new(directory, api_keys),
        })
    }

    /// Resolve one request. Ordering: a malformed path fails fast before the
    /// throttle is consulted; throttling runs before existence/capability
    /// evaluation so floods are rejected cheaply.
    ///
    /// # Errors
    ///
    /// Returns `RouterError::Storage` when the directory's backing store
    /// fails mid-decision.
    pub async fn route(
        &self,
        method: &Method,
        raw_path: &str,
        connection_uri_domain: Option<&str>,
        api_key: Option<&str>,
    ) -> Result<ResolvedRequest, RouterError> {
        let Ok(parsed) = self.resolver.resolve(raw_path) else {
            tracing::debug!(path = raw_path, "base path mismatch");
            return Ok(ResolvedRequest {
                identifier: TenantIdentifier::new(connection_uri_domain, None, None),
                residual: raw_path.to_owned(),
                outcome: RouteOutcome::NotFound,
            });
        };

        let identifier = TenantIdentifier::new(
            connection_uri_domain,
            parsed.app_id.as_deref(),
            parsed.tenant_id.as_deref(),
        );

        let key = self.table.throttle_key(method, &parsed.residual);
        if self.throttle.admit(&key).is_err() {
            tracing::warn!(%identifier, residual = %parsed.residual, "request throttled");
            return Ok(ResolvedRequest {
                identifier,
                residual: parsed.residual,
                outcome: RouteOutcome::Throttled,
            });
        }

        let decision = self
            .gate
            .decide(&self.table, &parsed, &identifier, method, api_key)
            .await
            .map_err(RouterError::Storage)?;

        let outcome = match decision {
            GateDecision::Allow(route) => RouteOutcome::Allow(route.target),
            GateDecision::NotFound => RouteOutcome::NotFound,
            GateDecision::Forbidden => RouteOutcome::Forbidden,
        };
        tracing::debug!(%identifier, residual = %parsed.residual, ?outcome, "request resolved");

        Ok(ResolvedRequest {
            identifier,
            residual: parsed.residual,
            outcome,
        })
    }
}
