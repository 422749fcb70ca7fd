//! Notification sink
//!
//! The pipeline only produces [`Notification`] values; showing them (toasts,
//! stderr, a test buffer) is up to the [`Notifier`].

use std::fmt;

use serde::Serialize;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

/// A user-visible message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: Level,
    pub text: String,
}

impl Notification {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            text: text.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            Level::Success => write!(f, "[success] {}", self.text),
            Level::Error => write!(f, "[error] {}", self.text),
        }
    }
}

/// Receives notifications emitted by the pipeline.
pub trait Notifier {
    fn notify(&mut self, notification: Notification);
}

impl<F> Notifier for F
where
    F: FnMut(Notification) + Send,
{
    fn notify(&mut self, notification: Notification) {
        self(notification)
    }
}

/// Forwards notifications over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new(tx: mpsc::UnboundedSender<Notification>) -> Self {
        Self { tx }
    }

    /// Create a notifier plus the receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&mut self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            tracing::warn!("notification receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_notifier() {
        let mut seen = Vec::new();
        {
            let mut notifier = |n: Notification| seen.push(n);
            notifier.notify(Notification::success("saved"));
        }
        assert_eq!(seen, vec![Notification::success("saved")]);
    }

    #[test]
    fn test_channel_notifier() {
        let (mut notifier, mut rx) = ChannelNotifier::channel();
        notifier.notify(Notification::error("Not found"));

        let received = rx.try_recv().unwrap();
        assert_eq!(received.level, Level::Error);
        assert_eq!(received.to_string(), "[error] Not found");
    }
}
