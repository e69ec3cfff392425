//! Terminal front-end for the notifier: alerts go to stderr, confirm modals
//! are answered on stdin and the loader shows a status line.

use std::io::BufRead;
use std::io::Write;

use delivery_lib::notify::Alert;
use delivery_lib::notify::AlertKind;
use delivery_lib::notify::ModalConfig;
use delivery_lib::notify::ModalKind;
use delivery_lib::notify::Notifier;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Answers a confirm question; blocks the calling thread.
type Ask = fn(String) -> bool;

/// Renders `notifier` events until `cancel` fires.
pub fn attach(notifier: &Notifier, cancel: CancellationToken) -> JoinHandle<()> {
    spawn_console(notifier, cancel, ask_stdin)
}

fn spawn_console(notifier: &Notifier, cancel: CancellationToken, ask: Ask) -> JoinHandle<()> {
    let notifier = notifier.clone();

    // Subscribed here, not in the task, so events raised right after attach
    // are still seen.
    let mut alerts = notifier.subscribe();
    let mut modal = notifier.modal().watch();
    let mut loading = notifier.loader().watch();
    modal.mark_changed();
    loading.mark_changed();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    while let Some(alert) = alerts.try_recv() {
                        print_alert(&alert);
                    }
                    // Nobody is left to answer a waiting confirm
                    notifier.modal().close();
                    break;
                }
                Some(alert) = alerts.recv() => print_alert(&alert),
                Ok(()) = modal.changed() => {
                    let current = modal.borrow_and_update().clone();
                    if let Some(config) = current {
                        let answer = tokio::select! {
                            answer = prompt(config, ask) => answer,
                            _ = cancel.cancelled() => false,
                        };
                        notifier.modal().respond(answer);
                    }
                }
                Ok(()) = loading.changed() => {
                    if *loading.borrow_and_update() {
                        eprintln!("Loading...");
                    }
                }
            }
        }
    })
}

fn print_alert(alert: &Alert) {
    eprintln!("{} {}", badge(alert.kind), alert.message);
}

pub fn badge(kind: AlertKind) -> &'static str {
    match kind {
        AlertKind::Success => "[ok]",
        AlertKind::Error => "[error]",
        AlertKind::Warning => "[warning]",
        AlertKind::Info => "[info]",
    }
}

/// Only an explicit yes confirms. Info and warning modals are printed and
/// acknowledged straight away.
async fn prompt(config: ModalConfig, ask: Ask) -> bool {
    if config.kind != ModalKind::Confirm {
        eprintln!("{}\n{}", config.title, config.message);
        return true;
    }

    let question = format!("{}\n{} [y/N] ", config.title, config.message);
    let (tx, rx) = oneshot::channel();
    // Detached thread: an unanswered read must not hold up runtime shutdown.
    std::thread::spawn(move || {
        let _ = tx.send(ask(question));
    });
    rx.await.unwrap_or(false)
}

fn ask_stdin(question: String) -> bool {
    eprint!("{}", question);
    let _ = std::io::stderr().flush();
    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line) {
        Ok(_) => is_yes(&line),
        Err(_) => false,
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn always_yes(_: String) -> bool {
        true
    }

    fn never_answers(_: String) -> bool {
        std::thread::sleep(Duration::from_secs(30));
        true
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("no"));
    }

    #[tokio::test]
    async fn test_modal_shown_right_after_attach_is_answered() {
        let notifier = Notifier::new();
        let cancel = CancellationToken::new();
        let console = spawn_console(&notifier, cancel.clone(), always_yes);

        notifier.modal().warning("Heads up", "Shown before the console ran");
        let mut state = notifier.modal().watch();
        tokio::time::timeout(Duration::from_secs(2), state.wait_for(|s| s.is_none()))
            .await
            .unwrap()
            .unwrap();

        let confirmed = tokio::time::timeout(
            Duration::from_secs(2),
            notifier.confirm("Delete product", "Delete product #4?"),
        )
        .await
        .unwrap();
        assert!(confirmed);

        cancel.cancel();
        console.await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_abandons_open_prompt() {
        let notifier = Notifier::new();
        let cancel = CancellationToken::new();
        let console = spawn_console(&notifier, cancel.clone(), never_answers);

        let confirm = tokio::spawn({
            let notifier = notifier.clone();
            async move { notifier.confirm("Delete product", "Delete product #4?").await }
        });
        let mut state = notifier.modal().watch();
        state.wait_for(|s| s.is_some()).await.unwrap();

        cancel.cancel();
        let confirmed = tokio::time::timeout(Duration::from_secs(2), confirm)
            .await
            .unwrap()
            .unwrap();
        assert!(!confirmed);
        tokio::time::timeout(Duration::from_secs(2), console)
            .await
            .unwrap()
            .unwrap();
        assert!(!notifier.modal().is_visible());
    }
}
