//! HTTP surface: one fallback handler feeding every request through the
//! dispatcher.
//!
//! Tenant and app segments are dynamic path prefixes, so routes cannot be
//! registered statically on the axum router; the dispatcher owns the whole
//! path space under the configured base path.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};
use axum::Router;
use http::{header, StatusCode};
use request_router::problem::APPLICATION_PROBLEM_JSON;
use request_router::{
    Dispatcher, Problem, RequestThrottle, ResolvedRequest, RouteOutcome, RouteTable, RouteTarget,
    ThrottleConfig,
};
use tenant_directory::{CachedDirectory, MemoryStore};
use tenant_directory_sdk::{TenantIdentifier, TenantRecord};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;

/// Header carrying the API key.
const API_KEY_HEADER: &str = "api-key";

#[derive(Clone)]
pub struct AppState {
    dispatcher: Arc<Dispatcher>,
}

/// Build the directory, dispatcher and router from configuration.
///
/// # Errors
///
/// Returns an error on invalid base path, invalid throttle quota or a
/// failing seed write.
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let store = if config.directory.multi_tenancy {
        MemoryStore::new()
    } else {
        MemoryStore::single_tenant()
    };
    let directory = Arc::new(CachedDirectory::new(Arc::new(store)));

    for seed in &config.directory.tenants {
        let identifier = TenantIdentifier::new(
            seed.connection_uri_domain.as_deref(),
            seed.app_id.as_deref(),
            seed.tenant_id.as_deref(),
        );
        directory
            .create_or_update_tenant(TenantRecord::new(identifier, seed.capabilities.clone()))
            .await?;
    }

    let table = Arc::new(RouteTable::standard()?);
    let throttle = Arc::new(RequestThrottle::new(ThrottleConfig {
        rps: config.throttle.rps,
        burst: config.throttle.burst,
    })?);

    let dispatcher = Dispatcher::new(
        &config.server.base_path,
        table,
        throttle,
        directory,
        config.api_keys.clone(),
    )?;

    let state = AppState {
        dispatcher: Arc::new(dispatcher),
    };
    Ok(Router::new()
        .fallback(resolve_request)
        .with_state(state)
        .layer(TraceLayer::new_for_http()))
}

async fn resolve_request(State(state): State<AppState>, req: Request) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let api_key = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    match state.dispatcher.route(&method, &path, None, api_key).await {
        Ok(resolved) => render(&path, resolved),
        Err(err) => {
            tracing::error!(error = %err, path, "request resolution failed");
            problem_response(Problem::internal("tenant directory unavailable").with_instance(path))
        }
    }
}

fn render(path: &str, resolved: ResolvedRequest) -> Response {
    match resolved.outcome {
        RouteOutcome::Allow(RouteTarget::Hello) => (StatusCode::OK, "Hello").into_response(),
        RouteOutcome::Allow(RouteTarget::SignUp) => {
            // Business logic lives outside this core; acknowledge dispatch.
            axum::Json(serde_json::json!({
                "status": "OK",
                "tenantId": resolved.identifier.tenant_id(),
            }))
            .into_response()
        }
        RouteOutcome::NotFound => {
            problem_response(Problem::not_found("no such route or tenant").with_instance(path))
        }
        RouteOutcome::Forbidden => {
            problem_response(Problem::forbidden("not permitted for this address").with_instance(path))
        }
        RouteOutcome::Throttled => {
            problem_response(Problem::too_many_requests("request rate limit exceeded").with_instance(path))
        }
    }
}

fn problem_response(problem: Problem) -> Response {
    (
        problem.status,
        [(header::CONTENT_TYPE, APPLICATION_PROBLEM_JSON)],
        axum::Json(problem),
    )
        .into_response()
}
