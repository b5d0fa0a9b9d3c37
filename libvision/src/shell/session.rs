//! Shell session
//!
//! A [`Shell`] is one mounted instance of the site shell. Mounting spawns
//! the configuration provider exactly once; its completion is the only
//! thing that settles the view state. The state lives in a `watch` channel
//! whose sender only the shell's dispatch path touches, so readers can take
//! snapshots or wait for changes without being able to write.
//!
//! Failure is terminal for a shell. Recovering means dropping it and
//! mounting a new one, which starts the whole lifecycle again.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use libvision::provider::provider_for_source;
//! use libvision::shell::{Shell, ShellOptions};
//!
//! # async fn example() {
//! let shell = Shell::mount(provider_for_source("site.toml"), ShellOptions::default());
//! let state = shell.settled().await;
//! println!("settled, error = {}", state.error.is_some());
//!
//! let response = shell.respond_settled("/").await;
//! println!("{:?}", response.status());
//! # }
//! ```

use std::sync::{Arc, Mutex};

use chrono::Datelike;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::actions::ShellAction;
use super::reducer::reduce;
use super::state::ViewState;
use super::view::{select_view, ShellView, ViewKind};
use crate::config::{Config, DEFAULT_LANGUAGE, DEFAULT_SITE_TITLE};
use crate::events::{EventBus, EventReceiver, ShellEvent};
use crate::notify::{ToastOptions, Toaster};
use crate::pages::{PageRegistry, PageStatus};
use crate::provider::ConfigProvider;
use crate::render::{self, AppFrame};
use crate::router::{RouteTable, RouteTarget};

/// Capacity of the lifecycle event bus
const EVENT_CAPACITY: usize = 64;

/// Mount-time settings for a shell
#[derive(Clone)]
pub struct ShellOptions {
    /// Title shown before the site configuration is known
    pub title: String,
    pub language: String,
    /// Initial value of the external maintenance input
    pub maintenance: bool,
    pub routes: RouteTable,
    pub pages: PageRegistry,
    pub toasts: ToastOptions,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_SITE_TITLE.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            maintenance: false,
            routes: RouteTable::site(),
            pages: PageRegistry::site(),
            toasts: ToastOptions::default(),
        }
    }
}

impl ShellOptions {
    /// Options taken from the operational configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            title: config.site.title.clone(),
            language: config.site.language.clone(),
            maintenance: config.site.maintenance,
            toasts: ToastOptions::from(&config.notifications),
            ..Self::default()
        }
    }
}

/// What the shell answers for a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellResponse {
    Page {
        status: u16,
        view: ViewKind,
        html: String,
    },
    Redirect {
        location: String,
        /// The redirect replaces the requested URL in history
        replace: bool,
    },
}

impl ShellResponse {
    pub fn status(&self) -> u16 {
        match self {
            ShellResponse::Page { status, .. } => *status,
            ShellResponse::Redirect { .. } => 303,
        }
    }

    pub fn view(&self) -> Option<ViewKind> {
        match self {
            ShellResponse::Page { view, .. } => Some(*view),
            ShellResponse::Redirect { .. } => None,
        }
    }

    pub fn html(&self) -> Option<&str> {
        match self {
            ShellResponse::Page { html, .. } => Some(html),
            ShellResponse::Redirect { .. } => None,
        }
    }
}

/// Writes the view state; shared by the shell and its load task only
#[derive(Clone)]
struct Dispatcher {
    state: Arc<watch::Sender<ViewState>>,
    events: EventBus,
}

impl Dispatcher {
    fn dispatch(&self, action: ShellAction) {
        let mut transition = None;
        self.state.send_modify(|state| {
            let before = select_view(state).kind();
            *state = reduce(std::mem::take(state), action);
            let after = select_view(state).kind();
            if before != after {
                transition = Some((before, after));
            }
        });

        if let Some((from, to)) = transition {
            tracing::info!("Shell view changed: {} -> {}", from, to);
            self.events.emit(ShellEvent::ViewChanged { from, to });
        }
    }
}

pub struct Shell {
    dispatcher: Dispatcher,
    state: watch::Receiver<ViewState>,
    options: ShellOptions,
    toaster: Toaster,
    load: Mutex<Option<JoinHandle<()>>>,
}

impl Shell {
    /// Mount a shell and start loading its configuration
    ///
    /// The provider is called exactly once, on a spawned task. Pages start
    /// unloaded even when `options` came from an earlier mount. Must be
    /// called from within a Tokio runtime.
    pub fn mount(provider: Arc<dyn ConfigProvider>, options: ShellOptions) -> Self {
        let options = ShellOptions {
            pages: options.pages.fresh(),
            ..options
        };
        let initial = ViewState::new()
            .with_language(&options.language)
            .with_maintenance(options.maintenance);
        let (sender, receiver) = watch::channel(initial);
        let dispatcher = Dispatcher {
            state: Arc::new(sender),
            events: EventBus::new(EVENT_CAPACITY),
        };

        let load = tokio::spawn(load_config(provider, dispatcher.clone()));

        Self {
            dispatcher,
            state: receiver,
            toaster: Toaster::new(options.toasts.clone()),
            options,
            load: Mutex::new(Some(load)),
        }
    }

    /// Snapshot of the current view state
    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Branch the current state renders
    pub fn view_kind(&self) -> ViewKind {
        select_view(&self.state.borrow()).kind()
    }

    /// A receiver that observes every state change
    pub fn watch(&self) -> watch::Receiver<ViewState> {
        self.state.clone()
    }

    /// Subscribe to lifecycle events
    pub fn subscribe(&self) -> EventReceiver {
        self.dispatcher.events.subscribe()
    }

    pub fn toaster(&self) -> &Toaster {
        &self.toaster
    }

    pub fn options(&self) -> &ShellOptions {
        &self.options
    }

    /// Wait until the configuration load has resolved or failed
    ///
    /// Never returns for a shell unmounted while loading.
    pub async fn settled(&self) -> ViewState {
        let mut receiver = self.state.clone();
        let settled = match receiver.wait_for(ViewState::is_settled).await {
            Ok(state) => state.clone(),
            // The sender lives as long as `self`, so this only happens mid-drop
            Err(_) => self.state(),
        };
        settled
    }

    /// Flip the external maintenance input
    pub fn set_maintenance(&self, enabled: bool) {
        if self.state.borrow().maintenance_mode == enabled {
            return;
        }
        tracing::info!("Maintenance mode {}", if enabled { "enabled" } else { "disabled" });
        self.dispatcher.events.emit(ShellEvent::MaintenanceChanged { enabled });
        self.dispatcher.dispatch(ShellAction::MaintenanceChanged(enabled));
    }

    /// Answer `path` from the current state without waiting
    ///
    /// Loading, error and maintenance pages are served for every path; only
    /// the app branch consults the route table. A page that is still loading
    /// renders as a placeholder inside the chrome.
    pub fn respond(&self, path: &str) -> ShellResponse {
        let state = self.state();
        match select_view(&state) {
            ShellView::App(config) => {
                let Some(target) = self.options.routes.resolve(path) else {
                    let status = PageStatus::Failed(format!("no route for {}", path));
                    return self.app_response(&state, path, status);
                };
                match target {
                    RouteTarget::Redirect { to, replace } => ShellResponse::Redirect {
                        location: to.clone(),
                        replace: *replace,
                    },
                    RouteTarget::Page(id) => {
                        let status = match (self.options.pages.get(*id), state.config.as_ref()) {
                            (Some(page), Some(shared)) => page.poll(shared, &self.dispatcher.events),
                            _ => {
                                tracing::error!(
                                    "No page registered for {} ({})",
                                    id,
                                    config.organization.name
                                );
                                PageStatus::Failed(format!("page {} is not registered", id))
                            }
                        };
                        self.app_response(&state, path, status)
                    }
                }
            }
            other => self.branch_response(&state, other.kind()),
        }
    }

    /// Answer `path` once the configuration and the routed page have settled
    pub async fn respond_settled(&self, path: &str) -> ShellResponse {
        let state = self.settled().await;
        if let (ShellView::App(_), Some(RouteTarget::Page(id))) =
            (select_view(&state), self.options.routes.resolve(path))
        {
            if let (Some(page), Some(config)) = (self.options.pages.get(*id), state.config.as_ref()) {
                page.ready(config, &self.dispatcher.events).await;
            }
        }
        self.respond(path)
    }

    fn branch_response(&self, state: &ViewState, view: ViewKind) -> ShellResponse {
        let language = &state.current_language;
        let title = &self.options.title;
        let (status, markup) = match view {
            ViewKind::Error => (503, render::error_page(language, title)),
            ViewKind::Maintenance => (503, render::maintenance_page(language, title)),
            // App content is rendered by `app_response`
            ViewKind::Loading | ViewKind::App => (200, render::loading_page(language, title)),
        };
        let view = if view == ViewKind::App { ViewKind::Loading } else { view };
        ShellResponse::Page {
            status,
            view,
            html: markup.into_string(),
        }
    }

    fn app_response(&self, state: &ViewState, path: &str, page: PageStatus) -> ShellResponse {
        let Some(config) = state.config.as_deref() else {
            return self.branch_response(state, ViewKind::Loading);
        };
        let toasts = self.toaster.drain();
        let current_path = crate::router::normalize_path(path);
        let frame = AppFrame {
            language: &state.current_language,
            current_path: &current_path,
            year: chrono::Utc::now().year(),
            page: &page,
            toasts: &toasts,
            toast_options: self.toaster.options(),
        };
        ShellResponse::Page {
            status: 200,
            view: ViewKind::App,
            html: render::app_page(config, &frame).into_string(),
        }
    }

    /// Tear the shell down, aborting the load and any page loads in flight
    pub fn unmount(&self) {
        self.abort_tasks();
        self.dispatcher.events.emit(ShellEvent::Unmounted);
        tracing::debug!("Shell unmounted");
    }

    fn abort_tasks(&self) {
        let handle = self
            .load
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
        self.options.pages.cancel_all();
    }
}

impl Drop for Shell {
    fn drop(&mut self) {
        self.abort_tasks();
    }
}

async fn load_config(provider: Arc<dyn ConfigProvider>, dispatcher: Dispatcher) {
    let description = provider.describe();
    tracing::info!("Loading site configuration from {}", description);
    dispatcher.events.emit(ShellEvent::ConfigLoadStarted {
        provider: description.clone(),
    });

    match provider.load_config().await {
        Ok(config) => {
            tracing::info!("Loaded site configuration for {}", config.organization.name);
            dispatcher.events.emit(ShellEvent::ConfigLoaded {
                organization: config.organization.name.clone(),
            });
            dispatcher.dispatch(ShellAction::ConfigLoaded(Arc::new(config)));
        }
        Err(error) => {
            tracing::error!("Failed to load configuration from {}: {}", description, error);
            dispatcher.events.emit(ShellEvent::ConfigLoadFailed {
                error: error.to_string(),
            });
            dispatcher.dispatch(ShellAction::ConfigFailed(Arc::new(error)));
        }
    }
}
