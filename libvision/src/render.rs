//! HTML rendering
//!
//! Pure functions from state to markup, one per branch. Nothing here does
//! I/O or reads the clock; the caller passes in the year and the content.

use maud::{html, Markup, DOCTYPE};

use crate::chrome;
use crate::notify::{Toast, ToastOptions};
use crate::pages::PageStatus;
use crate::types::SiteConfig;

/// Message shown for every configuration failure
pub const CONFIG_ERROR_MESSAGE: &str =
    "Failed to load application configuration. Please refresh the page.";

pub const CONFIG_ERROR_TITLE: &str = "Configuration Error";

pub const MAINTENANCE_TITLE: &str = "Under Maintenance";

pub const MAINTENANCE_MESSAGE: &str =
    "We're currently updating our website. Please check back soon.";

/// Label of the reload control on the error page
pub const RELOAD_LABEL: &str = "Refresh Page";

/// Endpoint the reload control posts to
pub const RELOAD_PATH: &str = "/__shell/reload";

/// Seconds between automatic re-requests while something is pending
const PENDING_REFRESH_SECS: u32 = 1;

fn document(language: &str, title: &str, refresh: bool, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(language) {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                @if refresh {
                    meta http-equiv="refresh" content=(PENDING_REFRESH_SECS.to_string());
                }
                title { (title) }
                link rel="stylesheet" href="/static/site.css";
            }
            body { (body) }
        }
    }
}

fn centered(content: Markup) -> Markup {
    html! {
        div class="min-h-screen flex items-center justify-center bg-gray-50" {
            div class="text-center p-8" { (content) }
        }
    }
}

pub fn loading_page(language: &str, site_title: &str) -> Markup {
    let body = centered(html! {
        div class="spinner spinner-lg" role="status" aria-label="Loading" {}
        p class="loading-message" { "Loading " (site_title) "..." }
    });
    document(language, site_title, true, body)
}

pub fn error_page(language: &str, site_title: &str) -> Markup {
    let body = centered(html! {
        h1 class="error-title" { (CONFIG_ERROR_TITLE) }
        p class="error-message" { (CONFIG_ERROR_MESSAGE) }
        form method="post" action=(RELOAD_PATH) {
            button type="submit" class="reload-button" { (RELOAD_LABEL) }
        }
    });
    document(language, site_title, false, body)
}

pub fn maintenance_page(language: &str, site_title: &str) -> Markup {
    let body = centered(html! {
        h1 class="maintenance-title" { (MAINTENANCE_TITLE) }
        p class="maintenance-message" { (MAINTENANCE_MESSAGE) }
    });
    document(language, site_title, false, body)
}

/// Everything the app branch needs besides the configuration
pub struct AppFrame<'a> {
    pub language: &'a str,
    pub current_path: &'a str,
    pub year: i32,
    pub page: &'a PageStatus,
    pub toasts: &'a [Toast],
    pub toast_options: &'a ToastOptions,
}

pub fn app_page(config: &SiteConfig, frame: &AppFrame<'_>) -> Markup {
    let (title, content, pending) = match frame.page {
        PageStatus::Pending => (config.organization.name.clone(), page_placeholder(), true),
        PageStatus::Ready(page) => (page.title.clone(), page.body.clone(), false),
        // Unhandled page failures leave the content region empty
        PageStatus::Failed(_) => (config.organization.name.clone(), html! {}, false),
    };

    let body = html! {
        (chrome::wrap(config, frame.current_path, frame.year, content))
        (toast_region(frame.toasts, frame.toast_options))
    };
    document(frame.language, &title, pending, body)
}

fn page_placeholder() -> Markup {
    html! {
        div class="min-h-screen flex items-center justify-center page-placeholder" {
            div class="spinner spinner-md" role="status" aria-label="Loading page" {}
        }
    }
}

fn toast_region(toasts: &[Toast], options: &ToastOptions) -> Markup {
    let style = format!("background: {}; color: {};", options.background, options.color);
    html! {
        div class={ "toaster toaster-" (options.position) } aria-live="polite" {
            @for toast in toasts {
                div class={ "toast toast-" (toast.style.as_str()) }
                    style=(style)
                    data-toast-id=(toast.id.to_string())
                    data-duration-ms=(toast.duration.as_millis().to_string()) {
                    (toast.message)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{ToastStyle, Toaster};
    use crate::pages::PageContent;
    use std::sync::Arc;

    #[test]
    fn test_loading_page_refreshes() {
        let html = loading_page("en", "Father's Vision").into_string();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<html lang=\"en\">"));
        assert!(html.contains("Loading Father's Vision..."));
        assert!(html.contains("http-equiv=\"refresh\""));
    }

    #[test]
    fn test_error_page_has_message_and_reload_control() {
        let html = error_page("en", "Father's Vision").into_string();
        assert!(html.contains(CONFIG_ERROR_TITLE));
        assert!(html.contains(CONFIG_ERROR_MESSAGE));
        assert!(html.contains("action=\"/__shell/reload\""));
        assert!(html.contains(">Refresh Page</button>"));
        assert!(!html.contains("http-equiv"));
    }

    #[test]
    fn test_maintenance_page() {
        let html = maintenance_page("en", "Father's Vision").into_string();
        assert!(html.contains("Under Maintenance"));
        assert!(html.contains("Please check back soon."));
    }

    #[test]
    fn test_app_page_pending_shows_placeholder_inside_chrome() {
        let config = SiteConfig::named("Father's Vision");
        let options = ToastOptions::default();
        let frame = AppFrame {
            language: "en",
            current_path: "/",
            year: 2026,
            page: &PageStatus::Pending,
            toasts: &[],
            toast_options: &options,
        };
        let html = app_page(&config, &frame).into_string();
        assert!(html.contains("page-placeholder"));
        assert!(html.contains("site-nav"));
        assert!(html.contains("site-footer"));
        assert!(html.contains("http-equiv=\"refresh\""));
    }

    #[test]
    fn test_app_page_ready_renders_content_and_toasts() {
        let config = SiteConfig::named("Father's Vision");
        let toaster = Toaster::default();
        toaster.notify("Thanks for visiting", None, ToastStyle::Success);
        let toasts = toaster.drain();
        let status = PageStatus::Ready(Arc::new(PageContent {
            title: "Home".to_string(),
            body: html! { p { "home body" } },
        }));
        let frame = AppFrame {
            language: "en",
            current_path: "/",
            year: 2026,
            page: &status,
            toasts: &toasts,
            toast_options: toaster.options(),
        };

        let html = app_page(&config, &frame).into_string();
        assert!(html.contains("<title>Home</title>"));
        assert!(html.contains("<p>home body</p>"));
        assert!(html.contains("toaster toaster-top-right"));
        assert!(html.contains("toast toast-success"));
        assert!(html.contains("data-duration-ms=\"4000\""));
        assert!(!html.contains("page-placeholder"));
        assert!(!html.contains("http-equiv"));
    }
}
