//! Test utilities for admin-dispatch applications
//!
//! - [`TestHarness`]: state plus an action channel, for driving effect
//!   handlers and inspecting the actions they emit
//! - Assertion macros for verifying emitted actions
//!
//! # Example
//!
//! ```ignore
//! use admin_dispatch::testing::TestHarness;
//! use admin_dispatch::{EffectContext, TaskManager};
//!
//! let mut harness = TestHarness::<UserManagementState, Action>::default();
//! let tx = harness.sender();
//! let mut tasks = TaskManager::new(tx.clone());
//! handle_effect(Effect::Refresh, &mut EffectContext::new(&tx, &mut tasks));
//!
//! let emitted = harness.drain_emitted();
//! assert_emitted!(emitted, Action::UsersAdminFetch(_));
//! ```

use tokio::sync::mpsc;

use crate::{Action, ActionCategory};

/// State under test plus the action channel effect handlers emit into.
pub struct TestHarness<S, A: Action> {
    pub state: S,
    tx: mpsc::UnboundedSender<A>,
    rx: mpsc::UnboundedReceiver<A>,
}

impl<S, A: Action> TestHarness<S, A> {
    pub fn new(state: S) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { state, tx, rx }
    }

    /// Sender for an [`EffectContext`](crate::EffectContext) or a
    /// [`TaskManager`](crate::TaskManager).
    pub fn sender(&self) -> mpsc::UnboundedSender<A> {
        self.tx.clone()
    }

    pub fn emit(&self, action: A) {
        // The harness owns the receiver, so this cannot fail
        let _ = self.tx.send(action);
    }

    /// Everything emitted so far, in order.
    pub fn drain_emitted(&mut self) -> Vec<A> {
        let mut actions = Vec::new();
        while let Ok(action) = self.rx.try_recv() {
            actions.push(action);
        }
        actions
    }

    /// Wait for the next emitted action, e.g. one sent by a spawned task.
    ///
    /// Returns `None` if nothing arrives within `timeout`.
    pub async fn next_emitted(&mut self, timeout: std::time::Duration) -> Option<A> {
        tokio::time::timeout(timeout, self.rx.recv())
            .await
            .ok()
            .flatten()
    }

    /// Whether anything was emitted. Drains the queue.
    pub fn has_emitted(&mut self) -> bool {
        !self.drain_emitted().is_empty()
    }
}

impl<S: Default, A: Action> Default for TestHarness<S, A> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S, A: ActionCategory> TestHarness<S, A> {
    /// Drain emitted actions that belong to a category.
    ///
    /// Actions of other categories stay queued, in order.
    pub fn drain_category(&mut self, category: &str) -> Vec<A> {
        let (matching, rest): (Vec<A>, Vec<A>) = self
            .drain_emitted()
            .into_iter()
            .partition(|action| action.category() == Some(category));

        for action in rest {
            let _ = self.tx.send(action);
        }

        matching
    }

    /// Drains matching actions like [`drain_category`](Self::drain_category).
    pub fn has_category(&mut self, category: &str) -> bool {
        !self.drain_category(category).is_empty()
    }
}

/// Assert that an action matching a pattern was emitted.
#[macro_export]
macro_rules! assert_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            $actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` to be emitted, but got: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Assert that no action matching a pattern was emitted.
#[macro_export]
macro_rules! assert_not_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            !$actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` NOT to be emitted, but it was: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Find the first action matching a pattern.
#[macro_export]
macro_rules! find_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().find(|a| matches!(a, $pattern $(if $guard)?))
    };
}

/// Count how many actions match a pattern.
#[macro_export]
macro_rules! count_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().filter(|a| matches!(a, $pattern $(if $guard)?)).count()
    };
}

/// Assert that an action of a category was emitted.
#[macro_export]
macro_rules! assert_category_emitted {
    ($actions:expr, $category:expr) => {
        assert!(
            $actions.iter().any(|a| {
                use $crate::ActionCategory;
                a.category() == Some($category)
            }),
            "Expected action with category `{}` to be emitted, but got: {:?}",
            $category,
            $actions
        );
    };
}

/// Assert that no action of a category was emitted.
#[macro_export]
macro_rules! assert_category_not_emitted {
    ($actions:expr, $category:expr) => {
        assert!(
            !$actions.iter().any(|a| {
                use $crate::ActionCategory;
                a.category() == Some($category)
            }),
            "Expected NO action with category `{}` to be emitted, but got: {:?}",
            $category,
            $actions
        );
    };
}

/// Count how many actions belong to a category.
#[macro_export]
macro_rules! count_category {
    ($actions:expr, $category:expr) => {{
        use $crate::ActionCategory;
        $actions
            .iter()
            .filter(|a| a.category() == Some($category))
            .count()
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        UserFetch(u32),
        RolesFetch,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum TestCategory {
        User,
        Roles,
    }

    impl crate::Action for TestAction {
        fn name(&self) -> &'static str {
            match self {
                TestAction::UserFetch(_) => "UserFetch",
                TestAction::RolesFetch => "RolesFetch",
            }
        }
    }

    impl ActionCategory for TestAction {
        type Category = TestCategory;

        fn category(&self) -> Option<&'static str> {
            match self.category_enum() {
                TestCategory::User => Some("user"),
                TestCategory::Roles => Some("roles"),
            }
        }

        fn category_enum(&self) -> TestCategory {
            match self {
                TestAction::UserFetch(_) => TestCategory::User,
                TestAction::RolesFetch => TestCategory::Roles,
            }
        }
    }

    #[test]
    fn test_harness_emit_and_drain() {
        let mut harness = TestHarness::<(), TestAction>::new(());

        harness.emit(TestAction::UserFetch(1));
        harness.emit(TestAction::RolesFetch);

        let actions = harness.drain_emitted();
        assert_eq!(actions, vec![TestAction::UserFetch(1), TestAction::RolesFetch]);
        assert!(harness.drain_emitted().is_empty());
    }

    #[test]
    fn test_drain_category_keeps_others() {
        let mut harness = TestHarness::<(), TestAction>::new(());

        harness.emit(TestAction::UserFetch(1));
        harness.emit(TestAction::RolesFetch);
        harness.emit(TestAction::UserFetch(2));

        let users = harness.drain_category("user");
        assert_eq!(users.len(), 2);

        let rest = harness.drain_emitted();
        assert_eq!(rest, vec![TestAction::RolesFetch]);
    }

    #[tokio::test]
    async fn test_next_emitted_waits_for_sender() {
        let mut harness = TestHarness::<(), TestAction>::new(());
        let tx = harness.sender();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            let _ = tx.send(TestAction::RolesFetch);
        });

        let action = harness.next_emitted(Duration::from_millis(200)).await;
        assert_eq!(action, Some(TestAction::RolesFetch));
        assert_eq!(harness.next_emitted(Duration::from_millis(10)).await, None);
    }

    #[test]
    fn test_assert_macros() {
        let actions = vec![TestAction::UserFetch(7), TestAction::RolesFetch];

        assert_emitted!(actions, TestAction::UserFetch(7));
        assert_emitted!(actions, TestAction::UserFetch(n) if *n > 5);
        assert_not_emitted!(actions, TestAction::UserFetch(8));

        assert!(find_emitted!(actions, TestAction::RolesFetch).is_some());
        assert_eq!(count_emitted!(actions, TestAction::UserFetch(_)), 1);

        assert_category_emitted!(actions, "roles");
        assert_category_not_emitted!(actions, "authority");
        assert_eq!(count_category!(actions, "user"), 1);
    }
}
