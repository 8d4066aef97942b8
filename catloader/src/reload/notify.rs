//! User-facing notifications.

use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Warning,
    Error,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A message shown to the user for `duration`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub duration: Duration,
    pub kind: NotificationKind,
}

/// Sink for user-facing notifications.
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, message: &str, duration: Duration, kind: NotificationKind);
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, duration: Duration, kind: NotificationKind) {
        let duration_ms = duration.as_millis() as u64;
        match kind {
            NotificationKind::Info => info!(duration_ms, "{}", message),
            NotificationKind::Warning => warn!(duration_ms, "{}", message),
            NotificationKind::Error => error!(duration_ms, "{}", message),
        }
    }
}

/// Forwards notifications to a UI loop over a channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Creates the notifier and the receiving end for the UI.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, message: &str, duration: Duration, kind: NotificationKind) {
        // Receiver gone means the UI has shut down.
        let _ = self.tx.send(Notification {
            message: message.to_string(),
            duration,
            kind,
        });
    }
}
