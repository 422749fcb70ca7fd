//! Effect-based state management
//!
//! Reducers stay pure: instead of performing HTTP calls themselves they
//! return declarative effects next to the state change. The runtime hands
//! the effects to an effect handler, which spawns the actual work and feeds
//! the outcome back as new actions.
//!
//! ```ignore
//! fn reducer(state: &mut S, action: A) -> DispatchResult<E>
//! ```
//!
//! # Example
//!
//! ```ignore
//! use admin_dispatch::{Action, DispatchResult, EffectStore};
//!
//! enum Effect {
//!     Get { url: String },
//! }
//!
//! struct ListState { loading: bool, body: Option<String> }
//!
//! #[derive(Clone, Debug, Action)]
//! enum ListAction {
//!     ListFetch,
//!     DidLoadList(String),
//! }
//!
//! fn reducer(state: &mut ListState, action: ListAction) -> DispatchResult<Effect> {
//!     match action {
//!         ListAction::ListFetch => {
//!             state.loading = true;
//!             DispatchResult::changed_with(Effect::Get { url: "api/users".into() })
//!         }
//!         ListAction::DidLoadList(body) => {
//!             state.loading = false;
//!             state.body = Some(body);
//!             DispatchResult::changed()
//!         }
//!     }
//! }
//! ```

use std::marker::PhantomData;

use crate::action::Action;
use crate::store::Middleware;

/// What a reducer call produced: whether the state changed, and the
/// effects the runtime should run next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult<E> {
    pub changed: bool,
    pub effects: Vec<E>,
}

impl<E> Default for DispatchResult<E> {
    fn default() -> Self {
        Self::unchanged()
    }
}

impl<E> DispatchResult<E> {
    fn build(changed: bool, effects: Vec<E>) -> Self {
        Self { changed, effects }
    }

    pub fn unchanged() -> Self {
        Self::build(false, Vec::new())
    }

    pub fn changed() -> Self {
        Self::build(true, Vec::new())
    }

    /// Request work without touching the state (e.g. an intent that only
    /// allocates a request).
    pub fn effect(effect: E) -> Self {
        Self::build(false, vec![effect])
    }

    pub fn effects(effects: Vec<E>) -> Self {
        Self::build(false, effects)
    }

    pub fn changed_with(effect: E) -> Self {
        Self::build(true, vec![effect])
    }

    pub fn changed_with_many(effects: Vec<E>) -> Self {
        Self::build(true, effects)
    }

    /// Append one more effect.
    pub fn with(mut self, effect: E) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn mark_changed(self) -> Self {
        Self {
            changed: true,
            ..self
        }
    }

    pub fn has_effects(&self) -> bool {
        !self.effects.is_empty()
    }
}

/// Reducer that returns effects alongside the change flag.
pub type EffectReducer<S, A, E> = fn(&mut S, A) -> DispatchResult<E>;

/// [`Store`](crate::Store) for an [`EffectReducer`].
pub struct EffectStore<S, A, E> {
    state: S,
    reducer: EffectReducer<S, A, E>,
    _marker: PhantomData<(A, E)>,
}

impl<S, A, E> EffectStore<S, A, E>
where
    A: Action,
{
    pub fn new(state: S, reducer: EffectReducer<S, A, E>) -> Self {
        Self {
            state,
            reducer,
            _marker: PhantomData,
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Direct state access, bypassing the reducer. Meant for tests and
    /// fixtures.
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    pub fn dispatch(&mut self, action: A) -> DispatchResult<E> {
        (self.reducer)(&mut self.state, action)
    }
}

/// [`EffectStore`] behind a middleware.
///
/// The middleware sees every action before and after the reducer, plus
/// the change flag. It never sees the effects.
pub struct EffectStoreWithMiddleware<S, A, E, M>
where
    A: Action,
    M: Middleware<A>,
{
    store: EffectStore<S, A, E>,
    middleware: M,
}

impl<S, A, E, M> EffectStoreWithMiddleware<S, A, E, M>
where
    A: Action,
    M: Middleware<A>,
{
    pub fn new(state: S, reducer: EffectReducer<S, A, E>, middleware: M) -> Self {
        Self {
            store: EffectStore::new(state, reducer),
            middleware,
        }
    }

    pub fn state(&self) -> &S {
        self.store.state()
    }

    pub fn state_mut(&mut self) -> &mut S {
        self.store.state_mut()
    }

    pub fn middleware(&self) -> &M {
        &self.middleware
    }

    pub fn middleware_mut(&mut self) -> &mut M {
        &mut self.middleware
    }

    /// `before`, reducer, `after`. The reducer consumes a clone so the
    /// middleware still sees the action afterwards.
    pub fn dispatch(&mut self, action: A) -> DispatchResult<E> {
        self.middleware.before(&action);
        let result = self.store.dispatch(action.clone());
        self.middleware.after(&action, result.changed);
        result
    }
}
