//! Actions of the user-management slice
//!
//! Intents ask for an operation. The reducer answers each intent with a
//! [`Ticket`] and a call effect; the effect handler then reports the
//! operation's lifecycle through `DidStart`, `DidSucceed` and `DidFail`.

use std::fmt;

use admin_dispatch::{ActionSummary, Lifecycle, Phase, TaskKey};
use thiserror::Error;

use crate::api::{Data, RequestError, Response};
use crate::model::{PageRequest, User};

/// Actions dispatched to the user-management store.
#[derive(admin_dispatch::Action, Debug, Clone, PartialEq)]
#[action(infer_categories)]
pub enum Action {
    /// List users through the public endpoint
    UsersFetch(PageRequest),
    /// List users through the admin endpoint
    UsersAdminFetch(PageRequest),
    RolesFetch,
    /// Load a single user by login
    UserFetch(String),
    UserCreate(User),
    UserUpdate(User),
    /// Delete a user by login
    UserDelete(String),
    /// Restore the initial state
    UserManagementReset,

    /// The request for this ticket went out
    DidStart(Ticket),
    /// The request for this ticket succeeded
    DidSucceed(Ticket, Response),
    /// The request for this ticket failed
    DidFail(Ticket, Failure),
}

/// Async operations of the slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FetchUsers,
    FetchUsersAsAdmin,
    FetchRoles,
    FetchUser,
    CreateUser,
    UpdateUser,
    DeleteUser,
}

/// State a read operation fills; all writes share one slot.
///
/// Only the latest request per slot may update the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Users,
    Roles,
    User,
    Write,
}

impl Operation {
    /// Action type string, as seen by logs and relays.
    pub fn type_name(self) -> &'static str {
        match self {
            Operation::FetchUsers => "userManagement/FETCH_USERS",
            Operation::FetchUsersAsAdmin => "userManagement/FETCH_USERS_AS_ADMIN",
            Operation::FetchRoles => "userManagement/FETCH_ROLES",
            Operation::FetchUser => "userManagement/FETCH_USER",
            Operation::CreateUser => "userManagement/CREATE_USER",
            Operation::UpdateUser => "userManagement/UPDATE_USER",
            Operation::DeleteUser => "userManagement/DELETE_USER",
        }
    }

    pub fn is_write(self) -> bool {
        matches!(
            self,
            Operation::CreateUser | Operation::UpdateUser | Operation::DeleteUser
        )
    }

    pub fn slot(self) -> Slot {
        match self {
            Operation::FetchUsers | Operation::FetchUsersAsAdmin => Slot::Users,
            Operation::FetchRoles => Slot::Roles,
            Operation::FetchUser => Slot::User,
            Operation::CreateUser | Operation::UpdateUser | Operation::DeleteUser => Slot::Write,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl Slot {
    pub fn name(self) -> &'static str {
        match self {
            Slot::Users => "users",
            Slot::Roles => "roles",
            Slot::User => "user",
            Slot::Write => "write",
        }
    }
}

/// Monotonically increasing request number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Explicit notification texts attached to an operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Meta {
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

/// Identity of one in-flight request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub op: Operation,
    pub id: RequestId,
    pub meta: Meta,
}

impl Ticket {
    pub fn new(op: Operation, id: RequestId) -> Self {
        Self {
            op,
            id,
            meta: Meta::default(),
        }
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    /// Key of the task running this request.
    ///
    /// Reads share a key per slot, so a newer read aborts the older one.
    /// Writes get a key of their own and always run to completion.
    pub fn task_key(&self) -> TaskKey {
        match self.op.slot() {
            Slot::Write => TaskKey::new(format!("write-{}", self.id.0)),
            slot => TaskKey::new(slot.name()),
        }
    }
}

/// Why an operation was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Failure {
    #[error(transparent)]
    Http(#[from] RequestError),
    /// Failed outside the HTTP layer, e.g. the request task panicked
    #[error("{0}")]
    Unexpected(String),
}

/// Uniform access to what the notification pipeline inspects.
pub trait Envelope {
    fn operation(&self) -> Option<Operation>;
    fn meta(&self) -> Option<&Meta>;
    fn response(&self) -> Option<&Response>;
    fn failure(&self) -> Option<&Failure>;
}

impl Action {
    pub fn ticket(&self) -> Option<&Ticket> {
        match self {
            Action::DidStart(ticket)
            | Action::DidSucceed(ticket, _)
            | Action::DidFail(ticket, _) => Some(ticket),
            _ => None,
        }
    }
}

impl Envelope for Action {
    fn operation(&self) -> Option<Operation> {
        self.ticket().map(|ticket| ticket.op)
    }

    fn meta(&self) -> Option<&Meta> {
        self.ticket().map(|ticket| &ticket.meta)
    }

    fn response(&self) -> Option<&Response> {
        match self {
            Action::DidSucceed(_, response) => Some(response),
            _ => None,
        }
    }

    fn failure(&self) -> Option<&Failure> {
        match self {
            Action::DidFail(_, failure) => Some(failure),
            _ => None,
        }
    }
}

impl Lifecycle for Action {
    fn phase(&self) -> Option<Phase> {
        match self {
            Action::DidStart(_) => Some(Phase::Pending),
            Action::DidSucceed(..) => Some(Phase::Fulfilled),
            Action::DidFail(..) => Some(Phase::Rejected),
            _ => None,
        }
    }
}

impl ActionSummary for Action {
    fn summary(&self) -> String {
        match self {
            Action::UserCreate(user) | Action::UserUpdate(user) => {
                format!("{}(login={})", admin_dispatch::Action::name(self), user.login)
            }
            Action::DidStart(ticket) => format!("DidStart({} {})", ticket.op, ticket.id),
            Action::DidSucceed(ticket, response) => {
                let body = match &response.data {
                    Data::Users { users, total } => format!("{} of {} users", users.len(), total),
                    Data::Authorities(authorities) => format!("{} authorities", authorities.len()),
                    Data::User(user) => format!("user {}", user.login),
                    Data::Empty => "empty".to_string(),
                };
                format!(
                    "DidSucceed({} {}, status {}, {})",
                    ticket.op, ticket.id, response.status, body
                )
            }
            Action::DidFail(ticket, failure) => {
                format!("DidFail({} {}, {})", ticket.op, ticket.id, failure)
            }
            other => format!("{:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Headers;
    use admin_dispatch::Action as _;

    #[test]
    fn test_operation_kinds() {
        assert!(Operation::DeleteUser.is_write());
        assert!(!Operation::FetchUsersAsAdmin.is_write());
        assert_eq!(Operation::FetchUsers.slot(), Operation::FetchUsersAsAdmin.slot());
        assert_eq!(Operation::FetchRoles.type_name(), "userManagement/FETCH_ROLES");
    }

    #[test]
    fn test_task_keys() {
        let read = Ticket::new(Operation::FetchUsersAsAdmin, RequestId(4));
        assert_eq!(read.task_key().name(), "users");

        let write = Ticket::new(Operation::UpdateUser, RequestId(9));
        assert_eq!(write.task_key().name(), "write-9");
    }

    #[test]
    fn test_action_categories() {
        assert_eq!(Action::UsersFetch(PageRequest::default()).category(), Some("users"));
        assert_eq!(
            Action::UsersAdminFetch(PageRequest::default()).category(),
            Some("users_admin")
        );
        assert_eq!(Action::UserDelete("alice".into()).category(), Some("user"));
        assert!(Action::DidStart(Ticket::new(Operation::FetchRoles, RequestId(1))).is_async_result());
    }

    #[test]
    fn test_envelope_and_phase() {
        let ticket = Ticket::new(Operation::FetchUser, RequestId(1)).with_meta(Meta {
            success_message: Some("Loaded".into()),
            error_message: None,
        });
        let response = Response::new(200, Headers::new(), Data::User(User::default()));
        let action = Action::DidSucceed(ticket, response.clone());

        assert_eq!(action.phase(), Some(Phase::Fulfilled));
        assert_eq!(action.operation(), Some(Operation::FetchUser));
        assert_eq!(
            action.meta().and_then(|m| m.success_message.as_deref()),
            Some("Loaded")
        );
        assert_eq!(action.response(), Some(&response));
        assert!(action.failure().is_none());

        let intent = Action::RolesFetch;
        assert_eq!(intent.phase(), None);
        assert!(intent.meta().is_none());
    }

    #[test]
    fn test_summary_hides_payloads() {
        let users = vec![User::default(); 3];
        let action = Action::DidSucceed(
            Ticket::new(Operation::FetchUsers, RequestId(2)),
            Response::new(200, Headers::new(), Data::Users { users, total: 40 }),
        );
        assert_eq!(
            action.summary(),
            "DidSucceed(userManagement/FETCH_USERS #2, status 200, 3 of 40 users)"
        );
        assert_eq!(action.name(), "DidSucceed");

        let failure = Failure::Unexpected("task panicked".into());
        let action = Action::DidFail(Ticket::new(Operation::DeleteUser, RequestId(5)), failure);
        assert_eq!(
            action.summary(),
            "DidFail(userManagement/DELETE_USER #5, task panicked)"
        );
    }
}
