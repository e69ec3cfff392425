//! Toast alerts, a modal dialog slot and a loading indicator.
//!
//! A [`Notifier`] is created once and cloned into whatever needs to raise
//! feedback; UIs subscribe to its channels.
//!
//! # Example
//!
//! ```
//! use delivery_lib::notify::{AlertKind, Notifier};
//!
//! let notifier = Notifier::new();
//! let mut alerts = notifier.subscribe();
//!
//! notifier.success("Product saved");
//! let alert = alerts.try_recv().unwrap();
//! assert_eq!(alert.kind, AlertKind::Success);
//! assert_eq!(alert.id, "alert-0");
//! ```

mod alert;
mod loader;
mod modal;

pub use alert::*;
pub use loader::*;
pub use modal::*;

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use chrono::Utc;
use tokio::sync::broadcast;

const ALERT_CHANNEL_CAPACITY: usize = 64;

/// Injectable notification hub. Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct Notifier {
    inner: Arc<NotifierInner>,
}

#[derive(Debug)]
struct NotifierInner {
    alerts: broadcast::Sender<Alert>,
    next_alert_id: AtomicU64,
    modal: Modal,
    loader: Loader,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (alerts, _) = broadcast::channel(ALERT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(NotifierInner {
                alerts,
                next_alert_id: AtomicU64::new(0),
                modal: Modal::new(),
                loader: Loader::new(),
            }),
        }
    }

    /// Publishes an alert to every current subscriber.
    pub fn notify(&self, kind: AlertKind, message: impl Into<String>) -> Alert {
        let id = self.inner.next_alert_id.fetch_add(1, Ordering::SeqCst);
        let alert = Alert {
            id: format!("alert-{}", id),
            kind,
            message: message.into(),
            timestamp: Utc::now(),
        };

        match kind {
            AlertKind::Error => log::error!("[{}] {}", kind, alert.message),
            AlertKind::Warning => log::warn!("[{}] {}", kind, alert.message),
            _ => log::info!("[{}] {}", kind, alert.message),
        }

        // No subscribers is not an error
        let _ = self.inner.alerts.send(alert.clone());
        alert
    }

    pub fn success(&self, message: impl Into<String>) -> Alert {
        self.notify(AlertKind::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) -> Alert {
        self.notify(AlertKind::Error, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> Alert {
        self.notify(AlertKind::Warning, message)
    }

    pub fn info(&self, message: impl Into<String>) -> Alert {
        self.notify(AlertKind::Info, message)
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription::new(self.inner.alerts.subscribe())
    }

    /// Shows a confirm modal and waits for the answer.
    pub async fn confirm(&self, title: impl Into<String>, message: impl Into<String>) -> bool {
        self.inner.modal.confirm(title, message).await
    }

    pub fn modal(&self) -> &Modal {
        &self.inner.modal
    }

    pub fn loader(&self) -> &Loader {
        &self.inner.loader
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_increment_and_reach_all_subscribers() {
        let notifier = Notifier::new();
        let mut first = notifier.subscribe();
        let mut second = notifier.clone().subscribe();

        notifier.info("one");
        notifier.error("two");

        assert_eq!(first.try_recv().unwrap().id, "alert-0");
        assert_eq!(first.try_recv().unwrap().id, "alert-1");
        assert_eq!(second.try_recv().unwrap().kind, AlertKind::Info);
        assert!(first.try_recv().is_none());
    }

    #[test]
    fn test_late_subscriber_misses_earlier_alerts() {
        let notifier = Notifier::new();
        notifier.warning("before");
        let mut late = notifier.subscribe();
        assert!(late.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_recv_ends_when_notifier_dropped() {
        let notifier = Notifier::new();
        let mut alerts = notifier.subscribe();
        notifier.success("saved");
        drop(notifier);
        assert_eq!(alerts.recv().await.map(|a| a.message), Some("saved".into()));
        assert_eq!(alerts.recv().await, None);
    }
}
