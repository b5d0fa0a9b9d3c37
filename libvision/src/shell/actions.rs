//! Actions for the reducer pattern
//!
//! Every change to a [`super::ViewState`] is described by one of these.

use std::sync::Arc;

use crate::error::ConfigLoadError;
use crate::types::SiteConfig;

/// Actions that trigger view state transitions
#[derive(Debug, Clone)]
pub enum ShellAction {
    // === Configuration load completion ===
    /// The provider resolved
    ConfigLoaded(Arc<SiteConfig>),

    /// The provider failed
    ConfigFailed(Arc<ConfigLoadError>),

    // === External inputs ===
    /// The maintenance switch was flipped
    MaintenanceChanged(bool),
}
