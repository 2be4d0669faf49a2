//! Tenant Directory SDK
//!
//! Shared contract between the tenant directory service and its consumers:
//! hierarchical tenant identifiers, persisted tenant records, the
//! `TenantDirectoryClient` trait and the directory error type.

pub mod api;
pub mod error;
pub mod models;

pub use api::TenantDirectoryClient;
pub use error::DirectoryError;
pub use models::{Capability, TenantIdentifier, TenantRecord};
