use std::sync::Arc;

use tokio::sync::watch;

/// Global busy indicator.
#[derive(Debug, Clone)]
pub struct Loader {
    state: Arc<watch::Sender<bool>>,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader {
    pub fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self {
            state: Arc::new(state),
        }
    }

    pub fn show(&self) {
        log::trace!("Loader shown");
        self.state.send_replace(true);
    }

    pub fn hide(&self) {
        log::trace!("Loader hidden");
        self.state.send_replace(false);
    }

    pub fn is_loading(&self) -> bool {
        *self.state.borrow()
    }

    pub fn watch(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }

    /// Shows the loader until the guard is dropped.
    pub fn guard(&self) -> LoaderGuard {
        self.show();
        LoaderGuard {
            loader: self.clone(),
        }
    }
}

/// Hides the loader on drop.
#[derive(Debug)]
#[must_use = "the loader hides as soon as the guard is dropped"]
pub struct LoaderGuard {
    loader: Loader,
}

impl Drop for LoaderGuard {
    fn drop(&mut self) {
        self.loader.hide();
    }
}
