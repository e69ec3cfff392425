use std::sync::Arc;
use std::sync::Mutex;

use tokio::sync::oneshot;
use tokio::sync::watch;

/// Which buttons a modal shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    /// Confirm and cancel.
    Confirm,
    /// Acknowledge only.
    Info,
    /// Acknowledge only.
    Warning,
}

/// Content of a visible modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalConfig {
    pub kind: ModalKind,
    pub title: String,
    pub message: String,
    pub confirm_text: String,
    /// `None` hides the cancel button.
    pub cancel_text: Option<String>,
}

impl ModalConfig {
    fn confirm(title: String, message: String) -> Self {
        Self {
            kind: ModalKind::Confirm,
            title,
            message,
            confirm_text: "Confirm".into(),
            cancel_text: Some("Cancel".into()),
        }
    }

    fn info(title: String, message: String) -> Self {
        Self {
            kind: ModalKind::Info,
            title,
            message,
            confirm_text: "OK".into(),
            cancel_text: None,
        }
    }

    fn warning(title: String, message: String) -> Self {
        Self {
            kind: ModalKind::Warning,
            title,
            message,
            confirm_text: "Understood".into(),
            cancel_text: None,
        }
    }
}

/// What the UI should render; `None` means hidden.
pub type ModalState = Option<ModalConfig>;

/// The single modal slot.
///
/// Showing a new modal replaces the current one; a `confirm` that is
/// replaced or closed resolves to `false`.
#[derive(Debug, Clone)]
pub struct Modal {
    state: Arc<watch::Sender<ModalState>>,
    pending: Arc<Mutex<Option<oneshot::Sender<bool>>>>,
}

impl Default for Modal {
    fn default() -> Self {
        Self::new()
    }
}

impl Modal {
    pub fn new() -> Self {
        let (state, _) = watch::channel(None);
        Self {
            state: Arc::new(state),
            pending: Arc::new(Mutex::new(None)),
        }
    }

    /// Shows a confirm dialog and waits for [`respond`](Self::respond).
    pub async fn confirm(&self, title: impl Into<String>, message: impl Into<String>) -> bool {
        let (tx, rx) = oneshot::channel();
        self.show(ModalConfig::confirm(title.into(), message.into()), Some(tx));
        rx.await.unwrap_or(false)
    }

    pub fn info(&self, title: impl Into<String>, message: impl Into<String>) {
        self.show(ModalConfig::info(title.into(), message.into()), None);
    }

    pub fn warning(&self, title: impl Into<String>, message: impl Into<String>) {
        self.show(ModalConfig::warning(title.into(), message.into()), None);
    }

    /// Answers the open modal and hides it.
    ///
    /// Returns `false` if no confirm was waiting.
    pub fn respond(&self, confirmed: bool) -> bool {
        let waiting = self.take_pending();
        self.state.send_replace(None);
        match waiting {
            Some(tx) => tx.send(confirmed).is_ok(),
            None => false,
        }
    }

    /// Hides the modal; a waiting confirm resolves `false`.
    pub fn close(&self) {
        self.respond(false);
    }

    pub fn is_visible(&self) -> bool {
        self.state.borrow().is_some()
    }

    /// The modal currently shown.
    pub fn current(&self) -> ModalState {
        self.state.borrow().clone()
    }

    /// Follows modal changes.
    pub fn watch(&self) -> watch::Receiver<ModalState> {
        self.state.subscribe()
    }

    fn show(&self, config: ModalConfig, responder: Option<oneshot::Sender<bool>>) {
        let previous = {
            let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::replace(&mut *pending, responder)
        };
        if let Some(tx) = previous {
            let _ = tx.send(false);
        }
        log::debug!("Modal: {}", config.title);
        self.state.send_replace(Some(config));
    }

    fn take_pending(&self) -> Option<oneshot::Sender<bool>> {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn wait_visible(modal: &Modal) {
        let mut rx = modal.watch();
        rx.wait_for(|state| state.is_some()).await.unwrap();
    }

    #[tokio::test]
    async fn test_confirm_resolves_with_response() {
        let modal = Modal::new();
        let task = tokio::spawn({
            let modal = modal.clone();
            async move { modal.confirm("Delete", "Delete product?").await }
        });

        wait_visible(&modal).await;
        assert_eq!(modal.current().map(|c| c.kind), Some(ModalKind::Confirm));
        assert!(modal.respond(true));

        assert!(task.await.unwrap());
        assert!(!modal.is_visible());
    }

    #[tokio::test]
    async fn test_close_resolves_false() {
        let modal = Modal::new();
        let task = tokio::spawn({
            let modal = modal.clone();
            async move { modal.confirm("Delete", "Sure?").await }
        });
        wait_visible(&modal).await;
        modal.close();
        assert!(!task.await.unwrap());
    }

    #[tokio::test]
    async fn test_superseded_confirm_resolves_false() {
        let modal = Modal::new();
        let task = tokio::spawn({
            let modal = modal.clone();
            async move { modal.confirm("Delete", "Sure?").await }
        });
        wait_visible(&modal).await;

        modal.warning("Offline", "Backend unreachable");
        assert!(!task.await.unwrap());

        let current = modal.current().unwrap();
        assert_eq!(current.kind, ModalKind::Warning);
        assert_eq!(current.cancel_text, None);
        assert!(!modal.respond(true));
    }
}
