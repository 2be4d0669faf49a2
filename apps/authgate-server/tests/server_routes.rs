#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end tests against the built axum router: the probe matrix over
//! HTTP, problem payloads for failures, API-key gating and throttling.

use authgate_server::config::AppConfig;
use authgate_server::rest as http_app;
use axum::body::Body;
use axum::Router;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

fn test_config(base_path: &str, api_keys: Vec<String>) -> AppConfig {
    let mut config: AppConfig = serde_json::from_value(serde_json::json!({
        "directory": {
            "tenants": [
                { "app_id": "hello" },
                { "app_id": "hello", "tenant_id": "test" },
                { "tenant_id": "test" },
            ]
        }
    }))
    .unwrap();
    config.server.base_path = base_path.to_owned();
    config.api_keys = api_keys;
    config
}

async fn app(base_path: &str, api_keys: Vec<String>) -> Router {
    http_app::build_app(&test_config(base_path, api_keys))
        .await
        .unwrap()
}

async fn get(app: &Router, path: &str) -> (StatusCode, String) {
    send(app, "GET", path, None).await
}

async fn send(app: &Router, method: &str, path: &str, api_key: Option<&str>) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(key) = api_key {
        builder = builder.header("api-key", key);
    }
    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn probe_under_base_path() {
    let app = app("/base", vec![]).await;
    assert_eq!(get(&app, "/base").await, (StatusCode::OK, "Hello".to_owned()));
    assert_eq!(get(&app, "/base/hello").await, (StatusCode::OK, "Hello".to_owned()));
    assert_eq!(get(&app, "/").await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn probe_matrix_over_http() {
    let app = app("/hello", vec![]).await;

    for path in [
        "/hello",
        "/hello/",
        "/hello/hello",
        "/hello/hello/",
        "/hello/appid-hello/hello",
        "/hello/appid-hello/hello/",
    ] {
        let (status, body) = get(&app, path).await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "Hello"), "for {path}");
    }

    for path in ["/hello/appid-hello", "/hello/appid-hello/", "/abcd"] {
        assert_eq!(get(&app, path).await.0, StatusCode::NOT_FOUND, "for {path}");
    }

    for path in [
        "/hello/appid-hello/test",
        "/hello/appid-hello/test/",
        "/hello/appid-hello/test/hello",
    ] {
        assert_eq!(get(&app, path).await.0, StatusCode::FORBIDDEN, "for {path}");
    }
}

#[tokio::test]
async fn failures_are_problem_json() {
    let app = app("/hello", vec![]).await;
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/hello/appid-hello")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.headers()["content-type"],
        "application/problem+json"
    );
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let problem: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(problem["status"], 404);
    assert_eq!(problem["instance"], "/hello/appid-hello");
}

#[tokio::test]
async fn api_keys_exempt_the_probe_and_gate_signup() {
    let app = app("", vec!["asdfasdfasdf123412341234".to_owned()]).await;

    assert_eq!(get(&app, "/").await, (StatusCode::OK, "Hello".to_owned()));
    assert_eq!(get(&app, "/appid-hello/hello").await, (StatusCode::OK, "Hello".to_owned()));
    assert_eq!(get(&app, "/appid-hello").await.0, StatusCode::NOT_FOUND);

    let signup = "/appid-hello/test/recipe/signup";
    assert_eq!(send(&app, "POST", signup, None).await.0, StatusCode::FORBIDDEN);
    let (status, body) = send(&app, "POST", signup, Some("asdfasdfasdf123412341234")).await;
    assert_eq!(status, StatusCode::OK);
    let payload: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(payload["status"], "OK");
    assert_eq!(payload["tenantId"], "test");
}

#[tokio::test]
async fn flood_returns_too_many_requests() {
    let mut config = test_config("", vec![]);
    config.throttle.rps = 1;
    config.throttle.burst = 2;
    let app = http_app::build_app(&config).await.unwrap();

    assert_eq!(get(&app, "/hello").await.0, StatusCode::OK);
    assert_eq!(get(&app, "/hello").await.0, StatusCode::OK);
    assert_eq!(get(&app, "/hello").await.0, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn single_tenant_mode_resolves_everything_to_default() {
    let mut config = test_config("", vec![]);
    config.directory.multi_tenancy = false;
    let app = http_app::build_app(&config).await.unwrap();

    // Signup against an arbitrary tenant address degrades to the public
    // default, which exists with all capabilities.
    let (status, body) = send(&app, "POST", "/whatever/recipe/signup", None).await;
    assert_eq!(status, StatusCode::OK);
    let payload: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(payload["tenantId"], "whatever");
}
