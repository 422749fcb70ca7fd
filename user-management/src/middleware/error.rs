//! Error logging middleware

use admin_dispatch::{Action, Middleware};

use crate::action::{Envelope, Failure};
use crate::api::{Problem, RequestError};

/// Logs every rejected action, plus the server's explanation when the
/// failure carries a problem document.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorMiddleware {
    seen: usize,
}

impl ErrorMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rejected actions seen.
    pub fn seen(&self) -> usize {
        self.seen
    }
}

impl<A: Action + Envelope> Middleware<A> for ErrorMiddleware {
    fn before(&mut self, action: &A) {
        let Some(failure) = action.failure() else {
            return;
        };
        self.seen += 1;

        let action_type = action
            .operation()
            .map(|op| op.type_name())
            .unwrap_or_else(|| action.name());
        tracing::error!(action = action_type, reason = %failure, "caught at middleware");

        if let Failure::Http(RequestError::Status { response, .. }) = failure {
            if let Some(cause) = response.problem.as_ref().and_then(describe_problem) {
                tracing::error!(action = action_type, "actual cause: {cause}");
            }
        }
    }

    fn after(&mut self, _action: &A, _state_changed: bool) {}
}

/// Human-readable summary of a problem document: its message followed by
/// one line per field error.
pub fn describe_problem(problem: &Problem) -> Option<String> {
    let mut text = problem.message.clone().unwrap_or_default();
    for field_error in problem.field_errors.iter().flatten() {
        text.push_str(&format!(
            "\nfield: {}, Object: {}, message: {}",
            field_error.field, field_error.object_name, field_error.message
        ));
    }
    (!text.is_empty()).then_some(text)
}
