//! User-facing notifications ("toasts") raised by mutations.

use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// How long a toast stays on screen
const TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
  Success,
  Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
  pub title: String,
  pub message: String,
  pub level: Level,
}

impl Notification {
  pub fn success(message: impl Into<String>) -> Self {
    Self {
      title: "Success".to_string(),
      message: message.into(),
      level: Level::Success,
    }
  }

  pub fn error(message: impl Into<String>) -> Self {
    Self {
      title: "Error".to_string(),
      message: message.into(),
      level: Level::Error,
    }
  }
}

/// Sending half, cloned into every component that raises notifications.
#[derive(Debug, Clone)]
pub struct Notifier {
  tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
  pub fn notify(&self, notification: Notification) {
    // The center may already be gone during shutdown
    let _ = self.tx.send(notification);
  }
}

/// Receiving half, owned by the app. Keeps the newest notification on screen
/// until it expires.
#[derive(Debug)]
pub struct NotificationCenter {
  rx: mpsc::UnboundedReceiver<Notification>,
  current: Option<(Notification, Instant)>,
}

/// Create a connected notifier/center pair.
pub fn channel() -> (Notifier, NotificationCenter) {
  let (tx, rx) = mpsc::unbounded_channel();
  (
    Notifier { tx },
    NotificationCenter { rx, current: None },
  )
}

impl NotificationCenter {
  /// Pull pending notifications and expire the current toast.
  ///
  /// Returns `true` if what should be displayed changed.
  pub fn tick(&mut self) -> bool {
    let mut changed = false;

    while let Ok(notification) = self.rx.try_recv() {
      self.current = Some((notification, Instant::now()));
      changed = true;
    }

    if let Some((_, shown_at)) = &self.current {
      if shown_at.elapsed() > TOAST_TTL {
        self.current = None;
        changed = true;
      }
    }

    changed
  }

  /// Toast to display, if any
  pub fn current(&self) -> Option<&Notification> {
    self.current.as_ref().map(|(n, _)| n)
  }

  /// Drain everything pending without displaying it.
  #[cfg(test)]
  pub fn drain(&mut self) -> Vec<Notification> {
    let mut drained = Vec::new();
    while let Ok(notification) = self.rx.try_recv() {
      drained.push(notification);
    }
    drained
  }
}
