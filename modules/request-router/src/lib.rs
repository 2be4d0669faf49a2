//! Request Router
//!
//! The request hot path: maps an inbound `(method, path)` pair to the tenant
//! it addresses, checks the addressed tenant/application against the
//! directory, applies per-route policy (API keys, capabilities, address
//! shape) and rate control, and produces either a routing result or a
//! structured failure.
//!
//! Pipeline per request: [`path::PathResolver`] →
//! [`throttle::RequestThrottle`] → [`gate::RouteGate`], orchestrated by
//! [`dispatch::Dispatcher`].

pub mod dispatch;
pub mod gate;
pub mod path;
pub mod problem;
pub mod routes;
pub mod throttle;

pub use dispatch::{Dispatcher, ResolvedRequest, RouteOutcome, RouterError};
pub use gate::{GateDecision, RouteGate};
pub use path::{AddressShape, MalformedPath, ParsedPath, PathResolver};
pub use problem::Problem;
pub use routes::{RouteSpec, RouteTable, RouteTarget, ShapePolicy, ShapeRule};
pub use throttle::{RequestThrottle, Throttled, ThrottleConfig, ThrottleKey};
