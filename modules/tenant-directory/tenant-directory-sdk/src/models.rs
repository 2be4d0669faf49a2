//! Data model for the tenant directory.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Default connection URI domain used when a request carries no
/// recognized host-level namespace.
pub const DEFAULT_CONNECTION_URI_DOMAIN: &str = "";

/// Default application id.
pub const DEFAULT_APP_ID: &str = "public";

/// Default tenant id.
pub const DEFAULT_TENANT_ID: &str = "public";

/// Hierarchical address of a tenant: connection URI domain, application id
/// and tenant id, with the public defaults substituted for absent segments.
///
/// Identifiers are lowercased at construction and immutable afterwards.
/// Two identifiers are equal iff all three fields are equal after default
/// substitution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TenantIdentifier {
    connection_uri_domain: String,
    app_id: String,
    tenant_id: String,
}

impl TenantIdentifier {
    #[must_use]
    pub fn new(
        connection_uri_domain: Option<&str>,
        app_id: Option<&str>,
        tenant_id: Option<&str>,
    ) -> Self {
        Self {
            connection_uri_domain: connection_uri_domain
                .unwrap_or(DEFAULT_CONNECTION_URI_DOMAIN)
                .to_lowercase(),
            app_id: app_id.unwrap_or(DEFAULT_APP_ID).to_lowercase(),
            tenant_id: tenant_id.unwrap_or(DEFAULT_TENANT_ID).to_lowercase(),
        }
    }

    #[must_use]
    pub fn connection_uri_domain(&self) -> &str {
        &self.connection_uri_domain
    }

    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    #[must_use]
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    #[must_use]
    pub fn is_default_app(&self) -> bool {
        self.app_id == DEFAULT_APP_ID
    }

    #[must_use]
    pub fn is_default_tenant(&self) -> bool {
        self.tenant_id == DEFAULT_TENANT_ID
    }

    /// The fully-default ("public") identifier.
    #[must_use]
    pub fn base() -> Self {
        Self::new(None, None, None)
    }

    /// Project onto the application level: same domain and app, default tenant.
    #[must_use]
    pub fn as_app_identifier(&self) -> Self {
        Self {
            connection_uri_domain: self.connection_uri_domain.clone(),
            app_id: self.app_id.clone(),
            tenant_id: DEFAULT_TENANT_ID.to_owned(),
        }
    }
}

impl Default for TenantIdentifier {
    fn default() -> Self {
        Self::base()
    }
}

impl fmt::Display for TenantIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            self.connection_uri_domain, self.app_id, self.tenant_id
        )
    }
}

/// A named authentication mechanism that can be independently enabled per
/// tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    EmailPassword,
    ThirdParty,
    Passwordless,
}

impl Capability {
    /// All known capabilities.
    pub const ALL: [Self; 3] = [Self::EmailPassword, Self::ThirdParty, Self::Passwordless];
}

/// Persisted configuration for one tenant. A record's presence in the
/// directory *is* the tenant's existence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantRecord {
    pub identifier: TenantIdentifier,
    pub capabilities: BTreeSet<Capability>,
    /// Opaque extension configuration, not interpreted by the core.
    #[serde(default)]
    pub extension: serde_json::Value,
}

impl TenantRecord {
    #[must_use]
    pub fn new(identifier: TenantIdentifier, capabilities: BTreeSet<Capability>) -> Self {
        Self {
            identifier,
            capabilities,
            extension: serde_json::Value::Null,
        }
    }

    /// The always-present public tenant with every capability enabled.
    #[must_use]
    pub fn base_public() -> Self {
        Self::new(TenantIdentifier::base(), Capability::ALL.into_iter().collect())
    }

    #[must_use]
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}
