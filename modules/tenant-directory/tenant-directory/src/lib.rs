//! Tenant Directory
//!
//! Read-through cache over a pluggable tenant store. The directory answers
//! existence and configuration lookups on the request hot path and applies
//! administrative create/update writes (write-through, so reads observe
//! them). Stores advertise whether they support multi-application /
//! multi-tenant hierarchies; a store without that capability degrades to
//! single-tenant resolution where every identifier maps to the public
//! default.

pub mod backend;
pub mod directory;

pub use backend::memory::MemoryStore;
pub use backend::TenantStore;
pub use directory::CachedDirectory;
