//! View state
//!
//! The single record that decides what the shell renders. Transitions go
//! through [`super::reduce`].

use std::sync::Arc;

use crate::config::DEFAULT_LANGUAGE;
use crate::error::ConfigLoadError;
use crate::types::SiteConfig;

#[derive(Debug, Clone)]
pub struct ViewState {
    /// Site configuration; absent until the provider resolves, never cleared
    pub config: Option<Arc<SiteConfig>>,

    /// True from mount until the provider settles
    pub is_loading: bool,

    /// Provider failure; terminal for this shell
    pub error: Option<Arc<ConfigLoadError>>,

    /// External maintenance input
    pub maintenance_mode: bool,

    /// Language code for the rendered document
    pub current_language: String,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            config: None,
            is_loading: true,
            error: None,
            maintenance_mode: false,
            current_language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl ViewState {
    /// Fresh state for a shell that is about to load its configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.current_language = language.to_string();
        self
    }

    pub fn with_maintenance(mut self, enabled: bool) -> Self {
        self.maintenance_mode = enabled;
        self
    }

    /// The provider has resolved or failed
    pub fn is_settled(&self) -> bool {
        !self.is_loading
    }
}
