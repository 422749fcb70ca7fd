//! Action traits for type-safe state mutations

use std::fmt::Debug;
use std::hash::Hash;

/// Marker trait for actions that can be dispatched to the store
///
/// Actions represent intents to change state, or the results of async work.
/// They should be:
/// - Clone: Actions may be logged, replayed, or observed by several middleware
/// - Debug: For debugging and logging
/// - Send + 'static: Async tasks send them back across threads
///
/// Use `#[derive(Action)]` from `admin-dispatch-macros` to auto-implement this trait.
pub trait Action: Clone + Debug + Send + 'static {
    /// Get the action name for logging and filtering
    fn name(&self) -> &'static str;
}

/// Concise, human-readable form of an action for logs.
///
/// The default uses the `Debug` output. Override it for actions that carry
/// large payloads (lists of entities, raw response bodies).
pub trait ActionSummary: Action {
    /// Summarize the action for display.
    fn summary(&self) -> String {
        format!("{:?}", self)
    }
}

/// Category lookup, generated by `#[action(infer_categories)]`.
pub trait ActionCategory: Action {
    /// Category enum generated for the action type.
    type Category: Copy + Debug + Eq + Hash;

    /// Category name, if the action has one.
    fn category(&self) -> Option<&'static str>;

    /// Category as an enum value.
    fn category_enum(&self) -> Self::Category;
}
