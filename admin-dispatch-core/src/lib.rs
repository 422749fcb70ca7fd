//! Core traits and types for admin-dispatch
//!
//! This crate provides the foundational abstractions for building REST admin
//! clients with centralized state management, following a Redux/Elm-inspired
//! architecture.
//!
//! # Core Concepts
//!
//! - **Action**: Events that describe state changes
//! - **Store**: Centralized state container with effect-returning reducers
//! - **Middleware**: Observers that run before and after every reducer call
//! - **Effects**: Declarative side effects returned by reducers
//! - **Lifecycle**: Pending / fulfilled / rejected phases of async operations
//! - **Runtime**: Action queue that serializes reducers and async tasks
//!
//! # Basic Example
//!
//! ```ignore
//! use admin_dispatch_core::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! enum CounterAction {
//!     CountAdd,
//!     CountReset,
//! }
//!
//! #[derive(Default)]
//! struct CounterState {
//!     count: i32,
//! }
//!
//! fn reducer(state: &mut CounterState, action: CounterAction) -> DispatchResult<()> {
//!     match action {
//!         CounterAction::CountAdd => { state.count += 1; DispatchResult::changed() }
//!         CounterAction::CountReset => { state.count = 0; DispatchResult::changed() }
//!     }
//! }
//!
//! let mut store = EffectStore::new(CounterState::default(), reducer);
//! store.dispatch(CounterAction::CountAdd);
//! ```
//!
//! # Async Operation Pattern
//!
//! Async work uses a two-phase action pattern:
//!
//! 1. **Intent actions** ask for work (e.g., `UsersFetch`)
//! 2. **Result actions** carry the outcome back (e.g., `DidSucceed`, `DidFail`)
//!
//! The reducer answers an intent with an effect; the effect handler spawns
//! the request on the runtime's [`TaskManager`] and the task sends the
//! result action back into the queue:
//!
//! ```ignore
//! let mut runtime = EffectRuntime::from_store(store);
//! runtime.enqueue(Action::UsersFetch(PageRequest::default()));
//! runtime.run_until_idle(|effect, ctx| match effect {
//!     Effect::Call(ticket, call) => {
//!         ctx.emit(Action::DidStart(ticket.clone()));
//!         let client = client.clone();
//!         ctx.tasks().spawn(ticket.task_key(), async move {
//!             match client.execute(call).await {
//!                 Ok(response) => Action::DidSucceed(ticket, response),
//!                 Err(e) => Action::DidFail(ticket, e.into()),
//!             }
//!         });
//!     }
//! }).await;
//! ```
//!
//! The `Did*` naming convention clearly identifies result actions. With
//! `#[action(infer_categories)]` they are grouped under `"async_result"`.

pub mod action;
pub mod effect;
pub mod lifecycle;
pub mod logger;
pub mod runtime;
pub mod store;
pub mod tasks;
pub mod testing;

// Core trait exports
pub use action::{Action, ActionCategory, ActionSummary};

// Middleware exports
pub use store::Middleware;

// Effect exports
pub use effect::{DispatchResult, EffectReducer, EffectStore, EffectStoreWithMiddleware};

// Lifecycle exports
pub use lifecycle::{Lifecycle, LoadingBar, LoadingBarMiddleware, Phase};

// Logger exports
pub use logger::{
    glob_match, ActionLog, ActionLogConfig, ActionLogEntry, ActionLoggerConfig,
    ActionLoggerMiddleware,
};

// Runtime exports
pub use runtime::{EffectContext, EffectRuntime, EffectStoreLike};

// Task exports
pub use tasks::{TaskKey, TaskManager};

// Testing exports
pub use testing::TestHarness;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{Action, ActionCategory, ActionSummary};
    pub use crate::effect::{
        DispatchResult, EffectReducer, EffectStore, EffectStoreWithMiddleware,
    };
    pub use crate::lifecycle::{Lifecycle, LoadingBar, LoadingBarMiddleware, Phase};
    pub use crate::logger::{ActionLoggerConfig, ActionLoggerMiddleware};
    pub use crate::runtime::{EffectContext, EffectRuntime};
    pub use crate::store::Middleware;
    pub use crate::tasks::{TaskKey, TaskManager};
}
