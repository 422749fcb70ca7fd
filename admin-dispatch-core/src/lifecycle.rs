//! Async operation lifecycle and loading indicator tracking
//!
//! Every async operation produces three kinds of actions:
//! `pending` when the request goes out, then exactly one of `fulfilled` or
//! `rejected` when it settles. Actions expose their phase through
//! [`Lifecycle`], which lets generic middleware react to it without knowing
//! the concrete action type.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::store::Middleware;
use crate::Action;

/// Phase of an async operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Request issued, response outstanding.
    Pending,
    /// Request succeeded.
    Fulfilled,
    /// Request failed.
    Rejected,
}

impl Phase {
    /// Whether the operation is finished (fulfilled or rejected).
    pub fn is_settled(self) -> bool {
        !matches!(self, Phase::Pending)
    }
}

/// Actions that belong to an async operation lifecycle.
pub trait Lifecycle: Action {
    /// Phase of this action, `None` for plain (non-async) actions.
    fn phase(&self) -> Option<Phase>;
}

/// Shared counter of in-flight operations.
///
/// Cheap to clone; every clone observes the same counter. A UI shows the
/// loading bar while [`LoadingBar::is_visible`] is true.
#[derive(Debug, Clone, Default)]
pub struct LoadingBar {
    in_flight: Arc<AtomicUsize>,
}

impl LoadingBar {
    /// Create a hidden loading bar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one more in-flight operation.
    pub fn show(&self) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
    }

    /// Register a settled operation. Never goes below zero.
    pub fn hide(&self) {
        let _ = self
            .in_flight
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }

    /// Number of operations currently in flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Whether any operation is in flight.
    pub fn is_visible(&self) -> bool {
        self.in_flight() > 0
    }
}

/// Middleware that drives a [`LoadingBar`] from lifecycle actions.
#[derive(Debug, Clone, Default)]
pub struct LoadingBarMiddleware {
    bar: LoadingBar,
}

impl LoadingBarMiddleware {
    /// Create a middleware driving the given loading bar.
    pub fn new(bar: LoadingBar) -> Self {
        Self { bar }
    }

    /// The loading bar this middleware drives.
    pub fn bar(&self) -> &LoadingBar {
        &self.bar
    }
}

impl<A: Lifecycle> Middleware<A> for LoadingBarMiddleware {
    fn before(&mut self, action: &A) {
        match action.phase() {
            Some(Phase::Pending) => self.bar.show(),
            Some(Phase::Fulfilled | Phase::Rejected) => self.bar.hide(),
            None => {}
        }
    }

    fn after(&mut self, _action: &A, _state_changed: bool) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug)]
    enum Op {
        Start,
        Done,
        Fail,
        Other,
    }

    impl Action for Op {
        fn name(&self) -> &'static str {
            match self {
                Op::Start => "Start",
                Op::Done => "Done",
                Op::Fail => "Fail",
                Op::Other => "Other",
            }
        }
    }

    impl Lifecycle for Op {
        fn phase(&self) -> Option<Phase> {
            match self {
                Op::Start => Some(Phase::Pending),
                Op::Done => Some(Phase::Fulfilled),
                Op::Fail => Some(Phase::Rejected),
                Op::Other => None,
            }
        }
    }

    #[test]
    fn test_phase_settled() {
        assert!(!Phase::Pending.is_settled());
        assert!(Phase::Fulfilled.is_settled());
        assert!(Phase::Rejected.is_settled());
    }

    #[test]
    fn test_loading_bar_balances() {
        let bar = LoadingBar::new();
        let mut middleware = LoadingBarMiddleware::new(bar.clone());

        middleware.before(&Op::Start);
        middleware.before(&Op::Start);
        assert_eq!(bar.in_flight(), 2);
        assert!(bar.is_visible());

        middleware.before(&Op::Other);
        assert_eq!(bar.in_flight(), 2);

        middleware.before(&Op::Done);
        middleware.before(&Op::Fail);
        assert_eq!(bar.in_flight(), 0);
        assert!(!bar.is_visible());
    }

    #[test]
    fn test_loading_bar_never_negative() {
        let bar = LoadingBar::new();
        bar.hide();
        assert_eq!(bar.in_flight(), 0);

        bar.show();
        bar.hide();
        bar.hide();
        assert_eq!(bar.in_flight(), 0);
    }
}
