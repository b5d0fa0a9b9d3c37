//! Lazily loaded pages
//!
//! A page is produced by a [`PageLoader`] the first time the router mounts
//! it. Until the loader completes, the shell renders a placeholder in the
//! content region. There is no timeout; a failed load is terminal for that
//! page. Loads are cancelled explicitly through [`LazyPage::cancel`], which
//! the shell calls on unmount.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use maud::{html, Markup};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::events::{EventBus, ShellEvent};
use crate::router::PageId;
use crate::types::SiteConfig;

/// A rendered page body
#[derive(Debug, Clone)]
pub struct PageContent {
    pub title: String,
    pub body: Markup,
}

/// Asynchronous producer of a page's content
#[async_trait]
pub trait PageLoader: Send + Sync {
    async fn load(&self, config: Arc<SiteConfig>) -> Result<PageContent, String>;
}

/// Observable state of a lazy page
#[derive(Debug, Clone)]
pub enum PageStatus {
    Pending,
    Ready(Arc<PageContent>),
    Failed(String),
}

impl PageStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, PageStatus::Pending)
    }
}

enum Slot {
    Idle,
    Pending(JoinHandle<()>),
    Ready(Arc<PageContent>),
    Failed(String),
    Cancelled,
}

/// A page whose content is loaded on first use
pub struct LazyPage {
    id: PageId,
    loader: Arc<dyn PageLoader>,
    slot: Mutex<Slot>,
    settled: Notify,
}

impl LazyPage {
    pub fn new(id: PageId, loader: Arc<dyn PageLoader>) -> Arc<Self> {
        Arc::new(Self {
            id,
            loader,
            slot: Mutex::new(Slot::Idle),
            settled: Notify::new(),
        })
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        // A poisoned slot only means a panic elsewhere; the data is still a plain enum
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current status, starting the loader if nobody has asked yet
    ///
    /// Must be called from within a Tokio runtime.
    pub fn poll(self: &Arc<Self>, config: &Arc<SiteConfig>, events: &EventBus) -> PageStatus {
        let mut slot = self.slot();
        match &*slot {
            Slot::Idle => {
                let page = Arc::clone(self);
                let config = Arc::clone(config);
                let events = events.clone();
                let handle = tokio::spawn(async move {
                    let outcome = page.loader.load(config).await;
                    page.complete(outcome, &events);
                });
                *slot = Slot::Pending(handle);
                PageStatus::Pending
            }
            Slot::Pending(_) | Slot::Cancelled => PageStatus::Pending,
            Slot::Ready(content) => PageStatus::Ready(Arc::clone(content)),
            Slot::Failed(error) => PageStatus::Failed(error.clone()),
        }
    }

    /// Wait until the page is no longer pending, starting it if needed
    ///
    /// A cancelled page never settles; callers racing an unmount should
    /// wrap this in their own timeout.
    pub async fn ready(self: &Arc<Self>, config: &Arc<SiteConfig>, events: &EventBus) -> PageStatus {
        loop {
            let notified = self.settled.notified();
            let status = self.poll(config, events);
            if !status.is_pending() {
                return status;
            }
            notified.await;
        }
    }

    fn complete(&self, outcome: Result<PageContent, String>, events: &EventBus) {
        let mut slot = self.slot();
        if matches!(*slot, Slot::Cancelled) {
            return;
        }
        match outcome {
            Ok(content) => {
                tracing::debug!("Page {} loaded", self.id);
                events.emit(ShellEvent::PageLoaded { page: self.id });
                *slot = Slot::Ready(Arc::new(content));
            }
            Err(error) => {
                tracing::error!("Page {} failed to load: {}", self.id, error);
                events.emit(ShellEvent::PageFailed {
                    page: self.id,
                    error: error.clone(),
                });
                *slot = Slot::Failed(error);
            }
        }
        drop(slot);
        self.settled.notify_waiters();
    }

    /// Abort an in-flight load; the page stays pending for good
    pub fn cancel(&self) {
        let mut slot = self.slot();
        if let Slot::Pending(handle) = &*slot {
            handle.abort();
            *slot = Slot::Cancelled;
        } else if matches!(*slot, Slot::Idle) {
            *slot = Slot::Cancelled;
        }
    }
}

/// The pages a shell can mount, keyed by id
#[derive(Clone, Default)]
pub struct PageRegistry {
    pages: HashMap<PageId, Arc<LazyPage>>,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The site's pages
    pub fn site() -> Self {
        Self::new().with(PageId::Home, Arc::new(HomePage))
    }

    pub fn with(mut self, id: PageId, loader: Arc<dyn PageLoader>) -> Self {
        self.pages.insert(id, LazyPage::new(id, loader));
        self
    }

    pub fn get(&self, id: PageId) -> Option<&Arc<LazyPage>> {
        self.pages.get(&id)
    }

    /// Same loaders, with every page back in its unloaded state
    pub fn fresh(&self) -> Self {
        let pages = self
            .pages
            .iter()
            .map(|(id, page)| (*id, LazyPage::new(*id, Arc::clone(&page.loader))))
            .collect();
        Self { pages }
    }

    pub fn cancel_all(&self) {
        for page in self.pages.values() {
            page.cancel();
        }
    }
}

/// The home page, built from the site configuration
pub struct HomePage;

#[async_trait]
impl PageLoader for HomePage {
    async fn load(&self, config: Arc<SiteConfig>) -> Result<PageContent, String> {
        let org = &config.organization;
        let home = &config.home;
        let headline = home.headline.as_deref().unwrap_or(&org.name);

        let body = html! {
            section class="hero" {
                h1 class="hero-title" { (headline) }
                @if let Some(tagline) = &org.tagline {
                    p class="hero-tagline" { (tagline) }
                }
                @if let Some(cta) = &home.call_to_action {
                    a class="hero-cta" href=(cta.href) { (cta.label) }
                }
            }
            @if let Some(intro) = &home.intro {
                section class="intro" { p { (intro) } }
            }
            @if let Some(mission) = &org.mission {
                section class="mission" {
                    h2 { "Our Mission" }
                    p { (mission) }
                }
            }
            @for section in &home.sections {
                section class="content-section" {
                    h2 { (section.title) }
                    p { (section.body) }
                }
            }
        };

        Ok(PageContent {
            title: org.name.clone(),
            body,
        })
    }
}
