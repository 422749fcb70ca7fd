//! Middleware hooks around the store

use crate::Action;

/// Observer of every dispatched action.
///
/// A middleware can notify, log or relay, but it cannot swallow or
/// rewrite the action: the reducer always runs after `before` returns.
pub trait Middleware<A: Action> {
    fn before(&mut self, action: &A);

    /// `state_changed` is the reducer's change flag.
    fn after(&mut self, action: &A, state_changed: bool);
}
