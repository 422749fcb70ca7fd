//! User-management state record

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::action::{Operation, RequestId, Slot, Ticket};
use crate::model::User;

/// State of the user-management screen.
///
/// Only the slice reducer mutates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserManagementState {
    /// A read operation is in flight
    pub loading: bool,
    /// A write operation is in flight
    pub updating: bool,
    /// The last write succeeded
    pub update_success: bool,
    /// Display text of the last failure, cleared when the next operation starts
    pub error_message: Option<String>,
    pub users: Vec<User>,
    pub authorities: Vec<String>,
    /// The user being viewed or edited
    pub user: User,
    /// Total number of users on the server, from the last list call
    pub total_items: u64,
    #[serde(skip)]
    pub(crate) requests: RequestBook,
}

impl UserManagementState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any operation is in flight.
    pub fn is_busy(&self) -> bool {
        self.loading || self.updating
    }

    /// Restore the initial state.
    ///
    /// Requests still in flight become stale: their results are ignored.
    pub fn reset(&mut self) {
        let requests = std::mem::take(&mut self.requests).forget_in_flight();
        *self = Self {
            requests,
            ..Self::default()
        };
    }
}

/// Request id allocation and in-flight bookkeeping.
///
/// Reads are latest-wins per slot. Writes are never superseded, so each
/// in-flight write is tracked on its own.
#[derive(Debug, Clone, Default)]
pub(crate) struct RequestBook {
    next_id: u64,
    latest: HashMap<Slot, RequestId>,
    writes: BTreeSet<RequestId>,
}

// The id allocator is not part of the observable state.
impl PartialEq for RequestBook {
    fn eq(&self, other: &Self) -> bool {
        self.latest == other.latest && self.writes == other.writes
    }
}

impl RequestBook {
    /// Allocate a ticket for a new request.
    pub(crate) fn issue(&mut self, op: Operation) -> Ticket {
        self.next_id += 1;
        Ticket::new(op, RequestId(self.next_id))
    }

    /// Record the ticket as in flight. A read becomes the latest of its slot.
    pub(crate) fn begin(&mut self, ticket: &Ticket) {
        if ticket.op.is_write() {
            self.writes.insert(ticket.id);
            return;
        }
        let slot = ticket.op.slot();
        if let Some(previous) = self.latest.insert(slot, ticket.id) {
            if previous != ticket.id {
                tracing::debug!(
                    slot = slot.name(),
                    previous = %previous,
                    latest = %ticket.id,
                    "request superseded"
                );
            }
        }
    }

    /// Settle a ticket. Returns false for a read superseded by a newer one,
    /// and for anything started before a reset.
    pub(crate) fn settle(&mut self, ticket: &Ticket) -> bool {
        if ticket.op.is_write() {
            return self.writes.remove(&ticket.id);
        }
        let slot = ticket.op.slot();
        if self.latest.get(&slot) == Some(&ticket.id) {
            self.latest.remove(&slot);
            true
        } else {
            false
        }
    }

    pub(crate) fn reads_in_flight(&self) -> bool {
        !self.latest.is_empty()
    }

    pub(crate) fn writes_in_flight(&self) -> bool {
        !self.writes.is_empty()
    }

    fn forget_in_flight(mut self) -> Self {
        self.latest.clear();
        self.writes.clear();
        self
    }
}
