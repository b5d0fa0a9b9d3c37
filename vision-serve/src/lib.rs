//! HTTP front for the site shell
//!
//! Every GET that is not an API or static path is answered by the mounted
//! [`Shell`]. The reload control on the error page posts to
//! [`RELOAD_PATH`], which replaces the shell with a freshly mounted one and
//! so runs the configuration load again. A reload outside the error view
//! only redirects home.

use std::path::Path;
use std::sync::{Arc, RwLock};

use axum::{
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;

use libvision::config::{Config, ListenConfig};
use libvision::render::RELOAD_PATH;
use libvision::{ConfigProvider, Shell, ShellOptions, ShellResponse, ViewKind};

pub const KEEP_ALIVE_PATH: &str = "/api/keep_alive";

pub const STATIC_PREFIX: &str = "/static";

/// Which listener a server run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerMode {
    Dev,
    Preview,
}

impl ServerMode {
    pub fn listen<'a>(&self, config: &'a Config) -> &'a ListenConfig {
        match self {
            ServerMode::Dev => &config.server.dev,
            ServerMode::Preview => &config.server.preview,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServerMode::Dev => "dev",
            ServerMode::Preview => "preview",
        }
    }
}

/// Shared server state: the provider and the currently mounted shell
#[derive(Clone)]
pub struct AppState {
    provider: Arc<dyn ConfigProvider>,
    options: ShellOptions,
    shell: Arc<RwLock<Arc<Shell>>>,
}

impl AppState {
    /// Mount the first shell; must run inside a Tokio runtime
    pub fn new(provider: Arc<dyn ConfigProvider>, options: ShellOptions) -> Self {
        let shell = Arc::new(Shell::mount(Arc::clone(&provider), options.clone()));
        Self {
            provider,
            options,
            shell: Arc::new(RwLock::new(shell)),
        }
    }

    pub fn shell(&self) -> Arc<Shell> {
        let guard = self.shell.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    /// Unmount the current shell and mount a new one in its place
    pub fn remount(&self) -> Arc<Shell> {
        let fresh = Arc::new(Shell::mount(Arc::clone(&self.provider), self.options.clone()));
        let previous = {
            let mut guard = self.shell.write().unwrap_or_else(|poisoned| poisoned.into_inner());
            std::mem::replace(&mut *guard, Arc::clone(&fresh))
        };
        previous.unmount();
        info!("Shell remounted from {}", self.provider.describe());
        fresh
    }

    /// Unmount the current shell, cancelling whatever it still has in flight
    pub fn shutdown(&self) {
        self.shell().unmount();
    }
}

/// Adapts a [`ShellResponse`] to axum
pub struct ShellReply(pub ShellResponse);

impl IntoResponse for ShellReply {
    fn into_response(self) -> Response {
        match self.0 {
            ShellResponse::Page { status, html, .. } => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::OK);
                (status, [(header::CACHE_CONTROL, "no-store")], Html(html)).into_response()
            }
            // 303 See Other: the browser replaces the requested URL
            ShellResponse::Redirect { location, .. } => Redirect::to(&location).into_response(),
        }
    }
}

pub fn create_router(state: AppState, public_dir: &Path) -> Router {
    Router::new()
        .route(KEEP_ALIVE_PATH, get(keep_alive))
        .route(RELOAD_PATH, post(reload))
        .nest_service(STATIC_PREFIX, ServeDir::new(public_dir))
        .fallback(shell_page)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

async fn shell_page(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }
    ShellReply(state.shell().respond(uri.path())).into_response()
}

async fn reload(State(state): State<AppState>) -> Redirect {
    match state.shell().view_kind() {
        ViewKind::Error => {
            state.remount();
        }
        view => tracing::debug!("Ignoring reload while the shell shows {:?}", view),
    }
    Redirect::to("/")
}

async fn keep_alive(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "view": state.shell().view_kind(),
    }))
}
