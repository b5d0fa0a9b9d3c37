//! Vision - the site shell for the Father's Vision website
//!
//! This library loads the site configuration once per mount, decides which
//! of the loading, error, maintenance or app views to show, routes requests
//! and renders the page chrome around lazily loaded pages. The `vision-serve`
//! binary puts it behind HTTP; `vision-deploy` ships it.

pub mod chrome;
pub mod config;
pub mod deploy;
pub mod error;
pub mod events;
pub mod logging;
pub mod notify;
pub mod pages;
pub mod provider;
pub mod render;
pub mod router;
pub mod shell;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{ConfigLoadError, DeployError, Result, VisionError};
pub use events::{EventBus, ShellEvent};
pub use notify::{Toast, ToastStyle, Toaster};
pub use provider::{provider_for_source, ConfigProvider};
pub use router::{PageId, RouteTable};
pub use shell::{Shell, ShellOptions, ShellResponse, ViewKind, ViewState};
pub use types::SiteConfig;
