//! Route table
//!
//! An ordered list of `(pattern, target)` pairs. The first matching entry
//! wins; the site table ends in a wildcard that redirects to the root,
//! replacing the history entry, so any unknown path converges on `/`.
//!
//! ```
//! use libvision::router::{RouteTable, PageId};
//!
//! let routes = RouteTable::site();
//! let nav = routes.navigate("/nonexistent").unwrap();
//! assert_eq!(nav.final_path, "/");
//! assert_eq!(nav.page, PageId::Home);
//! assert!(nav.replaced);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::RouteError;

/// Redirect chains longer than this are treated as loops
pub const MAX_REDIRECTS: usize = 8;

/// Pages the router can mount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageId {
    Home,
}

impl PageId {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageId::Home => "home",
        }
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePattern {
    /// Matches one normalized path
    Exact(String),
    /// Matches anything
    Wildcard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    Page(PageId),
    Redirect {
        to: String,
        /// Replace the current history entry instead of pushing one
        replace: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub pattern: RoutePattern,
    pub target: RouteTarget,
}

/// One redirect followed during navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectHop {
    pub from: String,
    pub to: String,
    pub replace: bool,
}

/// Where a navigation ends up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub requested: String,
    pub final_path: String,
    pub page: PageId,
    pub hops: Vec<RedirectHop>,
    /// Every hop replaced history; the requested URL leaves no entry behind
    pub replaced: bool,
}

impl Navigation {
    pub fn redirected(&self) -> bool {
        !self.hops.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The site's routes: `/` is the home page, everything else goes home
    pub fn site() -> Self {
        Self::new().page("/", PageId::Home).fallback("/")
    }

    /// Mount `page` at exactly `path`
    pub fn page(mut self, path: &str, page: PageId) -> Self {
        self.routes.push(Route {
            pattern: RoutePattern::Exact(normalize_path(path)),
            target: RouteTarget::Page(page),
        });
        self
    }

    /// Redirect exactly `from` to `to`, replacing history
    pub fn redirect(mut self, from: &str, to: &str) -> Self {
        self.routes.push(Route {
            pattern: RoutePattern::Exact(normalize_path(from)),
            target: RouteTarget::Redirect {
                to: normalize_path(to),
                replace: true,
            },
        });
        self
    }

    /// Wildcard redirect to `to`, replacing history
    pub fn fallback(mut self, to: &str) -> Self {
        self.routes.push(Route {
            pattern: RoutePattern::Wildcard,
            target: RouteTarget::Redirect {
                to: normalize_path(to),
                replace: true,
            },
        });
        self
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// First target whose pattern matches `path`
    pub fn resolve(&self, path: &str) -> Option<&RouteTarget> {
        let path = normalize_path(path);
        self.routes
            .iter()
            .find(|route| match &route.pattern {
                RoutePattern::Exact(exact) => *exact == path,
                RoutePattern::Wildcard => true,
            })
            .map(|route| &route.target)
    }

    /// Follow redirects from `path` until a page matches
    pub fn navigate(&self, path: &str) -> Result<Navigation, RouteError> {
        let requested = normalize_path(path);
        let mut current = requested.clone();
        let mut hops = Vec::new();

        loop {
            match self.resolve(&current) {
                Some(RouteTarget::Page(page)) => {
                    let replaced = hops.iter().all(|hop: &RedirectHop| hop.replace);
                    return Ok(Navigation {
                        requested,
                        final_path: current,
                        page: *page,
                        hops,
                        replaced,
                    });
                }
                Some(RouteTarget::Redirect { to, replace }) => {
                    if hops.len() >= MAX_REDIRECTS {
                        return Err(RouteError::RedirectLoop {
                            path: requested,
                            hops: hops.len(),
                        });
                    }
                    hops.push(RedirectHop {
                        from: current.clone(),
                        to: to.clone(),
                        replace: *replace,
                    });
                    current = to.clone();
                }
                None => return Err(RouteError::NoMatch(current)),
            }
        }
    }
}

/// Normalize a request path for matching
///
/// Drops query and fragment, ensures a leading slash and removes trailing
/// slashes except for the root.
pub fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
