//! Layered server configuration: defaults → YAML file → environment
//! (`AUTHGATE__*`) → CLI overrides.

use std::collections::BTreeSet;
use std::path::Path;

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tenant_directory_sdk::Capability;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// When non-empty, every route that does not explicitly bypass API keys
    /// requires one of these values in the `api-key` header. The probe is
    /// always exempt.
    pub api_keys: Vec<String>,
    pub throttle: ThrottleSettings,
    pub directory: DirectoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Operator-configured prefix all routes are mounted under. Empty or
    /// starting with `/`.
    pub base_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3567".to_owned(),
            base_path: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThrottleSettings {
    pub rps: u32,
    pub burst: u32,
}

impl Default for ThrottleSettings {
    fn default() -> Self {
        Self { rps: 100, burst: 200 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirectoryConfig {
    /// When `false` the store is treated as single-tenant capable only and
    /// every identifier degrades to the public default.
    pub multi_tenancy: bool,
    /// Static tenant seeding applied at startup.
    pub tenants: Vec<TenantSeed>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            multi_tenancy: true,
            tenants: Vec::new(),
        }
    }
}

/// Configuration for one seeded tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TenantSeed {
    #[serde(default)]
    pub connection_uri_domain: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    /// Enabled capabilities; defaults to all.
    #[serde(default = "all_capabilities")]
    pub capabilities: BTreeSet<Capability>,
}

fn all_capabilities() -> BTreeSet<Capability> {
    Capability::ALL.into_iter().collect()
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns an error when the YAML file or environment overrides cannot
    /// be parsed into a valid configuration.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        let config: Self = figment
            .merge(Env::prefixed("AUTHGATE__").split("__"))
            .extract()?;
        Ok(config)
    }
}
