//! Toast notifications
//!
//! A generic `(message, duration, style)` channel. Toasts are queued until
//! the next app render drains them and are broadcast to subscribers as they
//! are raised.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::config::NotificationConfig;

/// Toasts kept while nobody renders; older ones are dropped first
pub const MAX_PENDING_TOASTS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastStyle {
    Blank,
    Success,
    Error,
    Loading,
}

impl ToastStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastStyle::Blank => "blank",
            ToastStyle::Success => "success",
            ToastStyle::Error => "error",
            ToastStyle::Loading => "loading",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub id: Uuid,
    pub message: String,
    pub duration: Duration,
    pub style: ToastStyle,
}

/// Presentation defaults for the toast region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastOptions {
    pub position: String,
    pub duration: Duration,
    pub background: String,
    pub color: String,
}

impl Default for ToastOptions {
    fn default() -> Self {
        Self::from(&NotificationConfig::default())
    }
}

impl From<&NotificationConfig> for ToastOptions {
    fn from(config: &NotificationConfig) -> Self {
        Self {
            position: config.position.clone(),
            duration: config.duration,
            background: config.background.clone(),
            color: config.color.clone(),
        }
    }
}

#[derive(Clone)]
pub struct Toaster {
    options: ToastOptions,
    pending: Arc<Mutex<VecDeque<Toast>>>,
    sender: broadcast::Sender<Toast>,
}

impl Toaster {
    pub fn new(options: ToastOptions) -> Self {
        let (sender, _) = broadcast::channel(MAX_PENDING_TOASTS);
        Self {
            options,
            pending: Arc::new(Mutex::new(VecDeque::new())),
            sender,
        }
    }

    pub fn options(&self) -> &ToastOptions {
        &self.options
    }

    fn pending(&self) -> MutexGuard<'_, VecDeque<Toast>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Raise a toast; `None` uses the configured default duration
    pub fn notify(&self, message: &str, duration: Option<Duration>, style: ToastStyle) -> Toast {
        let toast = Toast {
            id: Uuid::new_v4(),
            message: message.to_string(),
            duration: duration.unwrap_or(self.options.duration),
            style,
        };

        let mut pending = self.pending();
        if pending.len() == MAX_PENDING_TOASTS {
            pending.pop_front();
        }
        pending.push_back(toast.clone());
        drop(pending);

        let _ = self.sender.send(toast.clone());
        toast
    }

    pub fn success(&self, message: &str) -> Toast {
        self.notify(message, None, ToastStyle::Success)
    }

    pub fn error(&self, message: &str) -> Toast {
        self.notify(message, None, ToastStyle::Error)
    }

    /// Take every queued toast, oldest first
    pub fn drain(&self) -> Vec<Toast> {
        self.pending().drain(..).collect()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.sender.subscribe()
    }
}

impl Default for Toaster {
    fn default() -> Self {
        Self::new(ToastOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ToastOptions::default();
        assert_eq!(options.position, "top-right");
        assert_eq!(options.duration, Duration::from_millis(4000));
        assert_eq!(options.background, "#363636");
        assert_eq!(options.color, "#fff");
    }

    #[test]
    fn test_notify_uses_default_duration() {
        let toaster = Toaster::default();
        let toast = toaster.success("Saved");
        assert_eq!(toast.duration, Duration::from_secs(4));
        assert_eq!(toast.style, ToastStyle::Success);
    }

    #[test]
    fn test_drain_empties_queue_in_order() {
        let toaster = Toaster::default();
        toaster.notify("one", Some(Duration::from_secs(1)), ToastStyle::Blank);
        toaster.error("two");

        let drained = toaster.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message, "one");
        assert_eq!(drained[0].duration, Duration::from_secs(1));
        assert_eq!(drained[1].style, ToastStyle::Error);
        assert!(toaster.drain().is_empty());
    }

    #[test]
    fn test_queue_is_bounded() {
        let toaster = Toaster::default();
        for i in 0..MAX_PENDING_TOASTS + 5 {
            toaster.notify(&format!("toast {}", i), None, ToastStyle::Blank);
        }
        let drained = toaster.drain();
        assert_eq!(drained.len(), MAX_PENDING_TOASTS);
        assert_eq!(drained[0].message, "toast 5");
    }

    #[tokio::test]
    async fn test_subscribers_receive_toasts() {
        let toaster = Toaster::default();
        let mut rx = toaster.subscribe();
        toaster.notify("hello", None, ToastStyle::Loading);
        assert_eq!(rx.recv().await.unwrap().message, "hello");
    }
}
