//! Branch selection
//!
//! Rendering is a pure function of the view state, evaluated in a fixed
//! priority order: loading, error, maintenance, app.

use serde::{Deserialize, Serialize};

use super::state::ViewState;
use crate::error::ConfigLoadError;
use crate::types::SiteConfig;

/// The branch a state renders, borrowing what that branch needs
#[derive(Debug, Clone, Copy)]
pub enum ShellView<'a> {
    Loading,
    Error(&'a ConfigLoadError),
    Maintenance,
    App(&'a SiteConfig),
}

/// Branch identifier without the borrowed data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Loading,
    Error,
    Maintenance,
    App,
}

impl ShellView<'_> {
    pub fn kind(&self) -> ViewKind {
        match self {
            ShellView::Loading => ViewKind::Loading,
            ShellView::Error(_) => ViewKind::Error,
            ShellView::Maintenance => ViewKind::Maintenance,
            ShellView::App(_) => ViewKind::App,
        }
    }
}

impl ViewKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewKind::Loading => "loading",
            ViewKind::Error => "error",
            ViewKind::Maintenance => "maintenance",
            ViewKind::App => "app",
        }
    }
}

impl std::fmt::Display for ViewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Select the branch for `state`
///
/// A settled state without a configuration or an error cannot come out of
/// the reducer; it renders as loading rather than an app with nothing in it.
pub fn select_view(state: &ViewState) -> ShellView<'_> {
    if state.is_loading {
        return ShellView::Loading;
    }
    if let Some(error) = state.error.as_deref() {
        return ShellView::Error(error);
    }
    if state.maintenance_mode {
        return ShellView::Maintenance;
    }
    match state.config.as_deref() {
        Some(config) => ShellView::App(config),
        None => ShellView::Loading,
    }
}
