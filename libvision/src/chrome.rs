//! Navigation bar and footer
//!
//! Stateless markup around the routed content. The only input besides the
//! configuration is the current path (to mark the active link) and the year
//! printed in the copyright line.

use maud::{html, Markup};

use crate::types::{is_external, NavItem, SiteConfig};

pub fn navigation(config: &SiteConfig, current_path: &str) -> Markup {
    html! {
        nav class="site-nav" aria-label="Main navigation" {
            a class="site-brand" href="/" { (config.organization.name) }
            ul class="site-nav-links" {
                @for item in &config.navigation {
                    li { (nav_link(item, current_path)) }
                }
            }
        }
    }
}

fn nav_link(item: &NavItem, current_path: &str) -> Markup {
    let active = !is_external(&item.href) && item.href == current_path;
    html! {
        @if active {
            a class="nav-link active" href=(item.href) aria-current="page" { (item.label) }
        } @else if is_external(&item.href) {
            a class="nav-link" href=(item.href) rel="noopener" { (item.label) }
        } @else {
            a class="nav-link" href=(item.href) { (item.label) }
        }
    }
}

pub fn footer(config: &SiteConfig, year: i32) -> Markup {
    let org = &config.organization;
    html! {
        footer class="site-footer" {
            @if let Some(text) = &config.footer.text {
                p class="footer-text" { (text) }
            }
            @if !config.footer.links.is_empty() {
                ul class="footer-links" {
                    @for link in &config.footer.links {
                        li { a href=(link.href) { (link.label) } }
                    }
                }
            }
            @if let Some(email) = &org.contact_email {
                p class="footer-contact" {
                    a href={ "mailto:" (email) } { (email) }
                }
            }
            p class="footer-copyright" { "© " (year.to_string()) " " (org.name) }
        }
    }
}

/// Wrap routed content in the chrome
pub fn wrap(config: &SiteConfig, current_path: &str, year: i32, content: Markup) -> Markup {
    html! {
        div class="site" {
            (navigation(config, current_path))
            main class="site-main" { (content) }
            (footer(config, year))
        }
    }
}
