//! User-management slice reducer

use admin_dispatch::DispatchResult;

use crate::action::{Action, Failure, Operation, Ticket};
use crate::api::{Call, Data, Response};
use crate::effect::Effect;
use crate::model::User;
use crate::state::UserManagementState;

/// Reduce one action.
///
/// Intents only allocate a ticket and return a call effect; the state
/// changes once the operation's lifecycle actions come back.
pub fn reducer(state: &mut UserManagementState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::UsersFetch(page) => request(state, Operation::FetchUsers, Call::ListUsers(page)),
        Action::UsersAdminFetch(page) => request(
            state,
            Operation::FetchUsersAsAdmin,
            Call::ListUsersAsAdmin(page),
        ),
        Action::RolesFetch => request(state, Operation::FetchRoles, Call::ListAuthorities),
        Action::UserFetch(login) => request(state, Operation::FetchUser, Call::GetUser(login)),
        Action::UserCreate(user) => request(state, Operation::CreateUser, Call::CreateUser(user)),
        Action::UserUpdate(user) => request(state, Operation::UpdateUser, Call::UpdateUser(user)),
        Action::UserDelete(login) => {
            request(state, Operation::DeleteUser, Call::DeleteUser(login))
        }
        Action::UserManagementReset => {
            state.reset();
            DispatchResult::changed()
        }

        Action::DidStart(ticket) => {
            pending(state, &ticket);
            DispatchResult::changed()
        }
        Action::DidSucceed(ticket, response) => fulfilled(state, ticket, response),
        Action::DidFail(ticket, failure) => rejected(state, ticket, failure),
    }
}

fn request(state: &mut UserManagementState, op: Operation, call: Call) -> DispatchResult<Effect> {
    let ticket = state.requests.issue(op);
    DispatchResult::effect(Effect::Call(ticket, call))
}

fn pending(state: &mut UserManagementState, ticket: &Ticket) {
    state.requests.begin(ticket);
    state.error_message = None;
    state.update_success = false;
    if ticket.op.is_write() {
        state.updating = true;
    } else {
        state.loading = true;
    }
}

fn fulfilled(
    state: &mut UserManagementState,
    ticket: Ticket,
    response: Response,
) -> DispatchResult<Effect> {
    let is_write = ticket.op.is_write();

    if !state.requests.settle(&ticket) {
        tracing::debug!(op = %ticket.op, id = %ticket.id, "ignoring stale result");
        // Only a write from before a reset gets here; the server applied it
        return if is_write {
            DispatchResult::effect(Effect::Refresh)
        } else {
            DispatchResult::unchanged()
        };
    }

    match (ticket.op, response.data) {
        (Operation::FetchUsers | Operation::FetchUsersAsAdmin, Data::Users { users, total }) => {
            state.users = users;
            state.total_items = total;
        }
        (Operation::FetchRoles, Data::Authorities(authorities)) => {
            state.authorities = authorities;
        }
        (Operation::FetchUser | Operation::CreateUser | Operation::UpdateUser, Data::User(user)) => {
            state.user = user;
        }
        (Operation::DeleteUser, _) => {
            state.user = User::default();
        }
        (op, data) => {
            tracing::warn!(op = %op, ?data, "response does not match operation");
        }
    }

    if is_write {
        state.updating = state.requests.writes_in_flight();
        state.update_success = true;
        DispatchResult::changed_with(Effect::Refresh)
    } else {
        state.loading = state.requests.reads_in_flight();
        DispatchResult::changed()
    }
}

fn rejected(
    state: &mut UserManagementState,
    ticket: Ticket,
    failure: Failure,
) -> DispatchResult<Effect> {
    if !state.requests.settle(&ticket) {
        tracing::debug!(op = %ticket.op, id = %ticket.id, "ignoring stale failure");
        return DispatchResult::unchanged();
    }

    state.loading = state.requests.reads_in_flight();
    state.updating = state.requests.writes_in_flight();
    state.update_success = false;
    state.error_message = Some(failure.to_string());
    DispatchResult::changed()
}
