//! Hierarchical path parsing.
//!
//! Turns a raw request path into the `(app, tenant, residual)` shape that the
//! route gate works with. Parsing is purely structural: it never consults the
//! tenant directory, so a syntactically valid tenant segment is consumed
//! whether or not such a tenant exists. Existence is the gate's concern, and
//! only for routes that require it.

use std::collections::HashSet;

use thiserror::Error;

/// Reserved path-segment prefix marking an application id, e.g.
/// `appid-hello`.
pub const APP_ID_PREFIX: &str = "appid-";

/// The configured base path did not prefix the request path. Surfaced to the
/// caller as not-found: an unmatched base path means this server does not
/// serve that namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("request path does not match the configured base path")]
pub struct MalformedPath;

/// The operator-supplied base path is not usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid base path {0:?}: must be empty or start with '/'")]
pub struct InvalidBasePath(pub String);

/// Which address levels were present in the request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressShape {
    /// No app marker, no tenant segment.
    Public,
    /// A tenant segment without an app marker.
    TenantOnly,
    /// An app marker without a tenant segment.
    AppOnly,
    /// Both an app marker and a tenant segment.
    AppAndTenant,
}

/// Outcome of parsing one request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPath {
    pub app_id: Option<String>,
    pub tenant_id: Option<String>,
    /// Unconsumed remainder, always starting with `/` (`"/"` when empty).
    pub residual: String,
}

impl ParsedPath {
    #[must_use]
    pub fn shape(&self) -> AddressShape {
        match (self.app_id.is_some(), self.tenant_id.is_some()) {
            (false, false) => AddressShape::Public,
            (false, true) => AddressShape::TenantOnly,
            (true, false) => AddressShape::AppOnly,
            (true, true) => AddressShape::AppAndTenant,
        }
    }
}

/// Parses raw request paths against a configured base path and a set of
/// reserved top-level route names.
///
/// The grammar is deterministic: after the base path is stripped, one
/// optional `appid-` marker segment is consumed, then one further segment is
/// consumed as a tenant id unless it is a reserved top-level route name.
/// Trailing slashes and empty segments are insignificant.
#[derive(Debug, Clone)]
pub struct PathResolver {
    base_segments: Vec<String>,
    reserved: HashSet<String>,
}

impl PathResolver {
    /// # Errors
    ///
    /// Returns `InvalidBasePath` if `base_path` is non-empty and does not
    /// start with `/`.
    pub fn new(base_path: &str, reserved: HashSet<String>) -> Result<Self, InvalidBasePath> {
        if !base_path.is_empty() && !base_path.starts_with('/') {
            return Err(InvalidBasePath(base_path.to_owned()));
        }
        let base_segments = segments(base_path)
            .map(str::to_owned)
            .collect();
        Ok(Self {
            base_segments,
            reserved,
        })
    }

    /// # Errors
    ///
    /// Returns `MalformedPath` if the configured base path does not literally
    /// prefix `raw_path` (segment-wise), or an `appid-` marker carries no
    /// value.
    pub fn resolve(&self, raw_path: &str) -> Result<ParsedPath, MalformedPath> {
        let segs: Vec<&str> = segments(raw_path).collect();

        if segs.len() < self.base_segments.len()
            || !self
                .base_segments
                .iter()
                .zip(&segs)
                .all(|(base, seg)| base == seg)
        {
            return Err(MalformedPath);
        }

        let mut rest = &segs[self.base_segments.len()..];

        let app_id = match rest.first().and_then(|s| s.strip_prefix(APP_ID_PREFIX)) {
            Some("") => return Err(MalformedPath),
            Some(value) => {
                rest = &rest[1..];
                Some(value.to_lowercase())
            }
            None => None,
        };

        let tenant_id = match rest.first() {
            Some(seg) if !self.reserved.contains(*seg) => {
                let tenant = seg.to_lowercase();
                rest = &rest[1..];
                Some(tenant)
            }
            _ => None,
        };

        let mut residual = String::with_capacity(1 + rest.iter().map(|s| s.len() + 1).sum::<usize>());
        if rest.is_empty() {
            residual.push('/');
        } else {
            for seg in rest {
                residual.push('/');
                residual.push_str(seg);
            }
        }

        Ok(ParsedPath {
            app_id,
            tenant_id,
            residual,
        })
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}
