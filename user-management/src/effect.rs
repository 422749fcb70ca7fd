//! Side effects of the user-management slice

use std::sync::Arc;

use admin_dispatch::EffectContext;
use tokio_util::task::AbortOnDropHandle;

use crate::action::{Action, Failure, Ticket};
use crate::api::{Backend, Call};
use crate::model::PageRequest;

/// Effects returned by [`reducer`](crate::reducer::reducer).
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Run a REST call for this ticket
    Call(Ticket, Call),
    /// Reload the admin user list after a write
    Refresh,
}

/// Run an effect.
///
/// A call reports `DidStart` right away and then runs as a task keyed by
/// the ticket, which reports `DidSucceed` or `DidFail` when it settles.
pub fn handle_effect<B: Backend>(backend: &Arc<B>, effect: Effect, ctx: &mut EffectContext<Action>) {
    match effect {
        Effect::Call(ticket, call) => {
            ctx.emit(Action::DidStart(ticket.clone()));

            let backend = Arc::clone(backend);
            let key = ticket.task_key();
            ctx.tasks().spawn(key, async move {
                // A panicking request still settles, as `Failure::Unexpected`
                let request = AbortOnDropHandle::new(tokio::spawn(async move {
                    backend.execute(call).await
                }));

                match request.await {
                    Ok(Ok(response)) => Action::DidSucceed(ticket, response),
                    Ok(Err(error)) => Action::DidFail(ticket, Failure::Http(error)),
                    Err(join_error) => {
                        tracing::error!(op = %ticket.op, error = %join_error, "request task failed");
                        Action::DidFail(ticket, Failure::Unexpected(join_error.to_string()))
                    }
                }
            });
        }
        Effect::Refresh => ctx.emit(Action::UsersAdminFetch(PageRequest::default())),
    }
}
