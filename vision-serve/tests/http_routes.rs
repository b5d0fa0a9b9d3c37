//! Integration tests for the vision-serve router

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use libvision::provider::MockProvider;
use libvision::{ConfigLoadError, ConfigProvider, ShellOptions, SiteConfig, ViewKind};
use tempfile::TempDir;
use tower::ServiceExt;
use vision_serve::{create_router, AppState};

fn site() -> SiteConfig {
    SiteConfig::named("Father's Vision")
}

fn app(provider: MockProvider, options: ShellOptions) -> (AppState, Router, TempDir) {
    let public = TempDir::new().unwrap();
    std::fs::write(public.path().join("site.css"), "body { margin: 0; }").unwrap();
    let state = AppState::new(Arc::new(provider), options);
    let router = create_router(state.clone(), public.path());
    (state, router, public)
}

async fn get(router: &Router, uri: &str) -> axum::response::Response {
    router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Resolves on the first load, fails on every later one
#[derive(Default)]
struct FlakyProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl ConfigProvider for FlakyProvider {
    async fn load_config(&self) -> Result<SiteConfig, ConfigLoadError> {
        match self.calls.fetch_add(1, Ordering::SeqCst) {
            0 => Ok(site()),
            _ => Err(ConfigLoadError::Http("backend down".to_string())),
        }
    }

    fn describe(&self) -> String {
        "flaky".to_string()
    }
}

async fn post(router: &Router, uri: &str) -> axum::response::Response {
    router
        .clone()
        .oneshot(Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[tokio::test]
async fn test_loading_then_app() {
    let provider = MockProvider::resolving(site()).with_delay(Duration::from_millis(50));
    let (state, router, _public) = app(provider, ShellOptions::default());

    let response = get(&router, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Loading Father's Vision..."));

    state.shell().respond_settled("/").await;

    let response = get(&router, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    let html = body_text(response).await;
    assert!(html.contains("site-nav"));
    assert!(html.contains("hero-title"));
    assert!(html.contains("site-footer"));
}

#[tokio::test]
async fn test_unknown_path_redirects_home() {
    let (state, router, _public) = app(MockProvider::resolving(site()), ShellOptions::default());
    state.shell().settled().await;

    let response = get(&router, "/nonexistent").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
}

#[tokio::test]
async fn test_failure_renders_error_with_reload_control() {
    let (state, router, _public) = app(MockProvider::rejecting("network timeout"), ShellOptions::default());
    state.shell().settled().await;

    let response = get(&router, "/nonexistent").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let html = body_text(response).await;
    assert!(html.contains("Failed to load application configuration. Please refresh the page."));
    assert!(html.contains("Refresh Page"));
    assert!(!html.contains("network timeout"));
}

#[tokio::test]
async fn test_reload_remounts_and_calls_provider_again() {
    let provider = MockProvider::rejecting("network timeout");
    let counter = provider.clone();
    let (state, router, _public) = app(provider, ShellOptions::default());
    state.shell().settled().await;
    assert_eq!(counter.call_count(), 1);

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/__shell/reload")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");

    state.shell().settled().await;
    assert_eq!(counter.call_count(), 2);
}

#[tokio::test]
async fn test_reload_outside_error_view_keeps_loaded_site() {
    let provider = Arc::new(FlakyProvider::default());
    let public = TempDir::new().unwrap();
    let state = AppState::new(provider.clone(), ShellOptions::default());
    let router = create_router(state.clone(), public.path());
    state.shell().settled().await;
    assert_eq!(state.shell().view_kind(), ViewKind::App);

    let response = post(&router, "/__shell/reload").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");

    assert_eq!(state.shell().view_kind(), ViewKind::App);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

    let response = get(&router, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("hero-title"));
}

#[tokio::test]
async fn test_keep_alive_reports_view() {
    let options = ShellOptions {
        maintenance: true,
        ..ShellOptions::default()
    };
    let (state, router, _public) = app(MockProvider::resolving(site()), options);
    state.shell().settled().await;
    assert_eq!(state.shell().view_kind(), ViewKind::Maintenance);

    let response = get(&router, "/api/keep_alive").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["view"], "maintenance");
}

#[tokio::test]
async fn test_static_files_served_from_public_dir() {
    let (_state, router, _public) = app(MockProvider::resolving(site()), ShellOptions::default());

    let response = get(&router, "/static/site.css").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "body { margin: 0; }");
}

#[tokio::test]
async fn test_non_get_shell_request_rejected() {
    let (_state, router, _public) = app(MockProvider::resolving(site()), ShellOptions::default());

    let response = router
        .oneshot(Request::builder().method("DELETE").uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
