//! Runtime for effect-based stores.
//!
//! [`EffectRuntime`] owns the store and an action queue. Actions are taken
//! off the queue one at a time, pushed through middleware and reducer, and
//! the resulting effects are handed to an effect handler which may spawn
//! tasks. Tasks report back by sending actions into the same queue, so
//! every state mutation is serialized through the single dispatch loop.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::effect::{DispatchResult, EffectReducer, EffectStore, EffectStoreWithMiddleware};
use crate::store::Middleware;
use crate::tasks::TaskManager;
use crate::Action;

/// How often an idle-waiting runtime re-checks its running tasks.
const IDLE_POLL: Duration = Duration::from_millis(10);

/// Effect store interface used by `EffectRuntime`.
pub trait EffectStoreLike<S, A: Action, E> {
    /// Dispatch an action and return state changes plus effects.
    fn dispatch(&mut self, action: A) -> DispatchResult<E>;
    /// Get the current state.
    fn state(&self) -> &S;
}

impl<S, A: Action, E> EffectStoreLike<S, A, E> for EffectStore<S, A, E> {
    fn dispatch(&mut self, action: A) -> DispatchResult<E> {
        EffectStore::dispatch(self, action)
    }

    fn state(&self) -> &S {
        EffectStore::state(self)
    }
}

impl<S, A: Action, E, M: Middleware<A>> EffectStoreLike<S, A, E>
    for EffectStoreWithMiddleware<S, A, E, M>
{
    fn dispatch(&mut self, action: A) -> DispatchResult<E> {
        EffectStoreWithMiddleware::dispatch(self, action)
    }

    fn state(&self) -> &S {
        EffectStoreWithMiddleware::state(self)
    }
}

/// Context passed to effect handlers.
pub struct EffectContext<'a, A: Action> {
    action_tx: &'a mpsc::UnboundedSender<A>,
    tasks: &'a mut TaskManager<A>,
}

impl<'a, A: Action> EffectContext<'a, A> {
    /// Build a context from its parts.
    ///
    /// The runtime does this for every effect; tests use it to drive an
    /// effect handler directly.
    pub fn new(action_tx: &'a mpsc::UnboundedSender<A>, tasks: &'a mut TaskManager<A>) -> Self {
        Self { action_tx, tasks }
    }

    /// Send an action directly.
    pub fn emit(&self, action: A) {
        let _ = self.action_tx.send(action);
    }

    /// Access the action sender.
    pub fn action_tx(&self) -> &mpsc::UnboundedSender<A> {
        self.action_tx
    }

    /// Access the task manager.
    pub fn tasks(&mut self) -> &mut TaskManager<A> {
        self.tasks
    }
}

/// Runtime helper for effect-based stores.
pub struct EffectRuntime<S, A: Action, E, St: EffectStoreLike<S, A, E> = EffectStore<S, A, E>> {
    store: St,
    action_tx: mpsc::UnboundedSender<A>,
    action_rx: mpsc::UnboundedReceiver<A>,
    tasks: TaskManager<A>,
    cancel: CancellationToken,
    _state: std::marker::PhantomData<S>,
    _effect: std::marker::PhantomData<E>,
}

impl<S, A: Action, E> EffectRuntime<S, A, E, EffectStore<S, A, E>> {
    /// Create a runtime from state + effect reducer.
    pub fn new(state: S, reducer: EffectReducer<S, A, E>) -> Self {
        Self::from_store(EffectStore::new(state, reducer))
    }
}

impl<S, A: Action, E, St: EffectStoreLike<S, A, E>> EffectRuntime<S, A, E, St> {
    /// Create a runtime from an existing effect store.
    pub fn from_store(store: St) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let tasks = TaskManager::new(action_tx.clone());

        Self {
            store,
            action_tx,
            action_rx,
            tasks,
            cancel: CancellationToken::new(),
            _state: std::marker::PhantomData,
            _effect: std::marker::PhantomData,
        }
    }

    /// Send an action into the runtime queue.
    pub fn enqueue(&self, action: A) {
        let _ = self.action_tx.send(action);
    }

    /// Clone the action sender.
    pub fn action_tx(&self) -> mpsc::UnboundedSender<A> {
        self.action_tx.clone()
    }

    /// Access the current state.
    pub fn state(&self) -> &S {
        self.store.state()
    }

    /// Access the underlying store.
    pub fn store(&self) -> &St {
        &self.store
    }

    /// Access the task manager.
    pub fn tasks(&mut self) -> &mut TaskManager<A> {
        &mut self.tasks
    }

    /// Token that stops [`run_until_idle`](Self::run_until_idle) when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Dispatch a single action immediately, bypassing the queue.
    ///
    /// Effects are handed to `handle_effect` before returning.
    pub fn dispatch<FEffect>(&mut self, action: A, mut handle_effect: FEffect) -> bool
    where
        FEffect: FnMut(E, &mut EffectContext<A>),
    {
        self.process(action, &mut handle_effect)
    }

    fn process<FEffect>(&mut self, action: A, handle_effect: &mut FEffect) -> bool
    where
        FEffect: FnMut(E, &mut EffectContext<A>),
    {
        let result = self.store.dispatch(action);
        if result.has_effects() {
            let mut ctx = EffectContext::new(&self.action_tx, &mut self.tasks);
            for effect in result.effects {
                handle_effect(effect, &mut ctx);
            }
        }
        result.changed
    }

    /// Process queued actions until nothing is left to do.
    ///
    /// Returns once the queue is empty and no task is still running, or
    /// as soon as the cancel token fires. Returns the number of actions
    /// processed.
    pub async fn run_until_idle<FEffect>(&mut self, mut handle_effect: FEffect) -> usize
    where
        FEffect: FnMut(E, &mut EffectContext<A>),
    {
        let mut processed = 0;

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            let action = match self.action_rx.try_recv() {
                Ok(action) => action,
                Err(_) => {
                    self.tasks.prune_finished();
                    if self.tasks.is_empty() {
                        break;
                    }

                    // A task may finish without anything left to send, so
                    // wake up periodically to prune it.
                    tokio::select! {
                        _ = self.cancel.cancelled() => break,
                        received = self.action_rx.recv() => match received {
                            Some(action) => action,
                            None => break,
                        },
                        _ = tokio::time::sleep(IDLE_POLL) => continue,
                    }
                }
            };

            self.process(action, &mut handle_effect);
            processed += 1;
        }

        if self.cancel.is_cancelled() {
            tracing::debug!(tasks = self.tasks.len(), "runtime cancelled, aborting tasks");
            self.tasks.cancel_all();
        }

        processed
    }
}
