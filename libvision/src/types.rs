//! Site configuration types
//!
//! [`SiteConfig`] is what a configuration provider resolves to. It is
//! immutable once loaded and shared through `Arc` by the view state, the
//! chrome and the page loaders.

use serde::{Deserialize, Serialize};

use crate::error::ConfigLoadError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub organization: Organization,
    #[serde(default = "default_navigation")]
    pub navigation: Vec<NavItem>,
    #[serde(default)]
    pub home: HomeContent,
    #[serde(default)]
    pub footer: FooterContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub name: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub mission: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HomeContent {
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub intro: Option<String>,
    #[serde(default)]
    pub sections: Vec<ContentSection>,
    #[serde(default)]
    pub call_to_action: Option<NavItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSection {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FooterContent {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub links: Vec<NavItem>,
}

fn default_navigation() -> Vec<NavItem> {
    vec![NavItem {
        label: "Home".to_string(),
        href: "/".to_string(),
    }]
}

impl SiteConfig {
    /// Minimal configuration for an organization with default content
    pub fn named(name: &str) -> Self {
        Self {
            organization: Organization {
                name: name.to_string(),
                tagline: None,
                mission: None,
                contact_email: None,
            },
            navigation: default_navigation(),
            home: HomeContent::default(),
            footer: FooterContent::default(),
        }
    }

    /// Reject configurations the shell cannot render
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.organization.name.trim().is_empty() {
            return Err(ConfigLoadError::Invalid(
                "organization.name must not be empty".to_string(),
            ));
        }
        if let Some(item) = self.navigation.iter().find(|item| !item.href.starts_with('/') && !is_external(&item.href)) {
            return Err(ConfigLoadError::Invalid(format!(
                "navigation item '{}' has href '{}' (expected '/path' or an absolute URL)",
                item.label, item.href
            )));
        }
        Ok(())
    }
}

/// Absolute links leave the site; everything else goes through the router
pub fn is_external(href: &str) -> bool {
    href.starts_with("http://") || href.starts_with("https://") || href.starts_with("mailto:")
}
