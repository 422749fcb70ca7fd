//! Activity relay
//!
//! Publishes completed writes on an outbound channel, which a websocket
//! connection (or any other transport) can forward to other clients.

use admin_dispatch::{Lifecycle, Middleware, Phase};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::action::Envelope;
use crate::api::Data;

/// A completed write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    /// Operation type, e.g. `userManagement/CREATE_USER`
    pub action: &'static str,
    /// Login of the affected user, when the response names one
    pub login: Option<String>,
    pub status: u16,
}

/// Middleware relaying fulfilled writes as [`ActivityEvent`]s.
#[derive(Debug, Clone, Default)]
pub struct RelayMiddleware {
    tx: Option<mpsc::UnboundedSender<ActivityEvent>>,
    sent: usize,
}

impl RelayMiddleware {
    pub fn new(tx: mpsc::UnboundedSender<ActivityEvent>) -> Self {
        Self {
            tx: Some(tx),
            sent: 0,
        }
    }

    /// A relay with no transport; events are dropped.
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Create a relay plus the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ActivityEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn is_connected(&self) -> bool {
        self.tx.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    /// Number of events sent.
    pub fn sent(&self) -> usize {
        self.sent
    }
}

impl<A: Lifecycle + Envelope> Middleware<A> for RelayMiddleware {
    fn before(&mut self, _action: &A) {}

    fn after(&mut self, action: &A, _state_changed: bool) {
        if action.phase() != Some(Phase::Fulfilled) {
            return;
        }
        let (Some(op), Some(response)) = (action.operation(), action.response()) else {
            return;
        };
        if !op.is_write() {
            return;
        }
        let Some(tx) = &self.tx else {
            return;
        };

        let login = match &response.data {
            Data::User(user) if !user.login.is_empty() => Some(user.login.clone()),
            _ => None,
        };
        let event = ActivityEvent {
            action: op.type_name(),
            login,
            status: response.status,
        };

        if tx.send(event).is_err() {
            tracing::warn!("activity relay closed, disconnecting");
            self.tx = None;
        } else {
            self.sent += 1;
        }
    }
}
