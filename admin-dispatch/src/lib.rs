//! admin-dispatch: Centralized state management for async REST admin clients
//!
//! Like Redux/Elm, but headless. Reducers own all state mutations, async
//! work runs as keyed tasks, and middleware observes every dispatched action.
//!
//! # Example
//! ```ignore
//! use admin_dispatch::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! #[action(infer_categories)]
//! enum Action {
//!     UsersFetch(PageRequest),
//!     DidSucceed(Ticket, Response),
//! }
//! ```

// Re-export everything from core
pub use admin_dispatch_core::*;

// Re-export derive macros
pub use admin_dispatch_macros::Action;

/// Prelude for convenient imports
pub mod prelude {
    // Traits
    pub use admin_dispatch_core::{Action, ActionCategory, ActionSummary, Lifecycle, Phase};

    // Middleware
    pub use admin_dispatch_core::Middleware;

    // Effects and runtime
    pub use admin_dispatch_core::{
        DispatchResult, EffectContext, EffectReducer, EffectRuntime, EffectStore,
        EffectStoreWithMiddleware, TaskKey, TaskManager,
    };

    // Loading bar and action logging
    pub use admin_dispatch_core::{
        ActionLoggerConfig, ActionLoggerMiddleware, LoadingBar, LoadingBarMiddleware,
    };

    // Derive macros
    pub use admin_dispatch_macros::Action;
}
