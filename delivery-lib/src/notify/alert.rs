use std::fmt;
use std::time::Duration;
use std::time::Instant;

use chrono::DateTime;
use chrono::Utc;
use tokio::sync::broadcast;

/// How long an alert stays visible.
pub const ALERT_DURATION: Duration = Duration::from_secs(5);

/// Severity of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    Success,
    Error,
    Warning,
    Info,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertKind::Success => "success",
            AlertKind::Error => "error",
            AlertKind::Warning => "warning",
            AlertKind::Info => "info",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    /// `alert-N`, unique per notifier.
    pub id: String,
    pub kind: AlertKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Receives alerts published after it was created.
///
/// Dropping the subscription unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<Alert>,
}

impl Subscription {
    pub(crate) fn new(rx: broadcast::Receiver<Alert>) -> Self {
        Self { rx }
    }

    /// Waits for the next alert. Returns `None` once the notifier is gone.
    ///
    /// A subscriber that falls behind skips the alerts it missed.
    pub async fn recv(&mut self) -> Option<Alert> {
        loop {
            match self.rx.recv().await {
                Ok(alert) => return Some(alert),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    log::warn!("Alert subscriber lagged, skipped {} alerts", missed);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Returns an already published alert without waiting.
    pub fn try_recv(&mut self) -> Option<Alert> {
        loop {
            match self.rx.try_recv() {
                Ok(alert) => return Some(alert),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}

/// The alerts currently on screen, each expiring after its duration.
#[derive(Debug, Clone)]
pub struct AlertBoard {
    active: Vec<(Alert, Instant)>,
    duration: Duration,
}

impl Default for AlertBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertBoard {
    pub fn new() -> Self {
        Self::with_duration(ALERT_DURATION)
    }

    pub fn with_duration(duration: Duration) -> Self {
        Self {
            active: Vec::new(),
            duration,
        }
    }

    pub fn push(&mut self, alert: Alert) {
        self.push_at(alert, Instant::now());
    }

    pub fn push_at(&mut self, alert: Alert, shown_at: Instant) {
        self.active.push((alert, shown_at));
    }

    /// Removes one alert before it expires.
    pub fn dismiss(&mut self, id: &str) -> bool {
        let before = self.active.len();
        self.active.retain(|(alert, _)| alert.id != id);
        self.active.len() != before
    }

    /// Drops alerts older than the board's duration.
    pub fn prune(&mut self) {
        self.prune_at(Instant::now());
    }

    pub fn prune_at(&mut self, now: Instant) {
        let duration = self.duration;
        self.active
            .retain(|(_, shown_at)| now.saturating_duration_since(*shown_at) < duration);
    }

    /// When the oldest visible alert expires.
    pub fn next_expiry(&self) -> Option<Instant> {
        self.active
            .iter()
            .map(|(_, shown_at)| *shown_at + self.duration)
            .min()
    }

    /// Visible alerts, oldest first.
    pub fn visible(&self) -> impl Iterator<Item = &Alert> {
        self.active.iter().map(|(alert, _)| alert)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(id: &str) -> Alert {
        Alert {
            id: id.to_string(),
            kind: AlertKind::Info,
            message: "hello".into(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_board_expires_after_duration() {
        let start = Instant::now();
        let mut board = AlertBoard::new();
        board.push_at(alert("alert-0"), start);
        board.push_at(alert("alert-1"), start + Duration::from_secs(3));

        assert_eq!(board.next_expiry(), Some(start + ALERT_DURATION));

        board.prune_at(start + Duration::from_secs(4));
        assert_eq!(board.len(), 2);

        board.prune_at(start + Duration::from_secs(5));
        let ids: Vec<_> = board.visible().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["alert-1"]);

        board.prune_at(start + Duration::from_secs(8));
        assert!(board.is_empty());
    }

    #[test]
    fn test_dismiss() {
        let mut board = AlertBoard::new();
        board.push(alert("alert-0"));
        assert!(board.dismiss("alert-0"));
        assert!(!board.dismiss("alert-0"));
    }
}
