//! Task manager for async operations
//!
//! Runs the HTTP side of async operations as tokio tasks and sends their
//! result actions back to the runtime queue.
//!
//! - Spawning with a key that is already running aborts the older task,
//!   so only the latest request for that key can report back
//! - Tasks with distinct keys run concurrently
//! - Finished tasks are pruned so the runtime can detect when it is idle
//!
//! # Example
//!
//! ```ignore
//! use admin_dispatch::tasks::{TaskManager, TaskKey};
//!
//! let (action_tx, mut action_rx) = tokio::sync::mpsc::unbounded_channel();
//! let mut tasks = TaskManager::new(action_tx);
//!
//! // A second spawn with the "users" key aborts this one
//! tasks.spawn("users", async move {
//!     match client.list_users(&page).await {
//!         Ok(response) => Action::DidLoadUsers(response),
//!         Err(e) => Action::DidFailUsers(e),
//!     }
//! });
//!
//! tasks.cancel_all();
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};

use crate::Action;

/// Identifies a task for cancellation and replacement.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TaskKey(String);

impl TaskKey {
    /// Create a new task key.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the key name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for TaskKey {
    fn from(s: &'static str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TaskKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Keyed tokio tasks that each resolve to one action of type `A`.
pub struct TaskManager<A> {
    tasks: HashMap<TaskKey, AbortHandle>,
    action_tx: mpsc::UnboundedSender<A>,
}

impl<A> TaskManager<A>
where
    A: Action,
{
    /// Completed tasks send their action through `action_tx`.
    pub fn new(action_tx: mpsc::UnboundedSender<A>) -> Self {
        Self {
            tasks: HashMap::new(),
            action_tx,
        }
    }

    /// Spawn a task, cancelling any existing task with the same key.
    ///
    /// The action returned by the future is sent to the action channel.
    /// A cancelled task sends nothing.
    pub fn spawn<F>(&mut self, key: impl Into<TaskKey>, future: F) -> &mut Self
    where
        F: Future<Output = A> + Send + 'static,
    {
        let key = key.into();
        if let Some(previous) = self.tasks.remove(&key) {
            tracing::debug!(task = %key, "superseding running task");
            previous.abort();
        }

        let tx = self.action_tx.clone();
        let handle: JoinHandle<()> = tokio::spawn(async move {
            let action = future.await;
            if tx.send(action).is_err() {
                tracing::trace!("action queue closed, dropping task result");
            }
        });
        tracing::trace!(task = %key, "spawned");

        self.tasks.insert(key, handle.abort_handle());
        self
    }

    /// Abort the task under `key`, if any.
    pub fn cancel(&mut self, key: &TaskKey) {
        if let Some(handle) = self.tasks.remove(key) {
            handle.abort();
        }
    }

    pub fn cancel_all(&mut self) {
        self.tasks.drain().for_each(|(_, handle)| handle.abort());
    }

    /// Forget tasks that have already finished.
    ///
    /// A finished task has already sent its action, so after pruning an
    /// empty manager plus an empty queue means no more actions are coming.
    pub fn prune_finished(&mut self) {
        self.tasks.retain(|_, handle| !handle.is_finished());
    }

    /// Whether a task is tracked under `key`. A finished task counts
    /// until the next [`prune_finished`](Self::prune_finished).
    pub fn is_running(&self, key: &TaskKey) -> bool {
        self.tasks.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn running_keys(&self) -> impl Iterator<Item = &TaskKey> {
        self.tasks.keys()
    }
}

impl<A> Drop for TaskManager<A> {
    fn drop(&mut self) {
        self.tasks.drain().for_each(|(_, handle)| handle.abort());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Clone, Debug, PartialEq)]
    enum Fetched {
        Page(u32),
    }

    impl Action for Fetched {
        fn name(&self) -> &'static str {
            "Page"
        }
    }

    fn manager() -> (TaskManager<Fetched>, mpsc::UnboundedReceiver<Fetched>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (TaskManager::new(tx), rx)
    }

    async fn next(rx: &mut mpsc::UnboundedReceiver<Fetched>) -> Option<Fetched> {
        tokio::time::timeout(Duration::from_millis(200), rx.recv())
            .await
            .ok()
            .flatten()
    }

    async fn page_after(ms: u64, page: u32) -> Fetched {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Fetched::Page(page)
    }

    #[test]
    fn test_task_key_conversions() {
        let key: TaskKey = format!("write-{}", 7).into();
        assert_eq!(key, TaskKey::from("write-7"));
        assert_eq!(key.name(), "write-7");
        assert_eq!(key.to_string(), "write-7");
    }

    #[tokio::test]
    async fn test_result_reaches_queue() {
        let (mut tasks, mut rx) = manager();
        tasks.spawn("users", async { Fetched::Page(0) });
        assert_eq!(next(&mut rx).await, Some(Fetched::Page(0)));
    }

    #[tokio::test]
    async fn test_same_key_supersedes() {
        let (mut tasks, mut rx) = manager();
        let stale_finished = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&stale_finished);
        tasks.spawn("users", async move {
            let action = page_after(50, 1).await;
            flag.store(true, Ordering::SeqCst);
            action
        });
        tasks.spawn("users", async { Fetched::Page(2) });
        assert_eq!(tasks.len(), 1);

        assert_eq!(next(&mut rx).await, Some(Fetched::Page(2)));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!stale_finished.load(Ordering::SeqCst));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_distinct_keys_both_report() {
        let (mut tasks, mut rx) = manager();
        tasks.spawn("write-1", page_after(20, 1));
        tasks.spawn("write-2", page_after(10, 2));
        assert_eq!(tasks.len(), 2);

        assert_eq!(next(&mut rx).await, Some(Fetched::Page(2)));
        assert_eq!(next(&mut rx).await, Some(Fetched::Page(1)));
    }

    #[tokio::test]
    async fn test_cancel_silences_task() {
        let (mut tasks, mut rx) = manager();
        let key = TaskKey::new("user");
        tasks.spawn(key.clone(), page_after(50, 1));

        assert!(tasks.is_running(&key));
        tasks.cancel(&key);
        tasks.cancel(&key);
        assert!(!tasks.is_running(&key));
        assert_eq!(next(&mut rx).await, None);
    }

    #[tokio::test]
    async fn test_cancel_all_and_drop() {
        let (mut tasks, mut rx) = manager();
        tasks.spawn("users", page_after(50, 1));
        tasks.spawn("roles", page_after(50, 2));
        tasks.cancel_all();
        assert!(tasks.is_empty());

        tasks.spawn("users", page_after(50, 3));
        drop(tasks);
        assert_eq!(next(&mut rx).await, None);
    }

    #[tokio::test]
    async fn test_prune_keeps_running_tasks() {
        let (mut tasks, mut rx) = manager();
        tasks.spawn("user", async { Fetched::Page(1) });
        tasks.spawn("users", page_after(5_000, 2));

        assert_eq!(next(&mut rx).await, Some(Fetched::Page(1)));
        // The sender side finishes right after the send
        tokio::time::sleep(Duration::from_millis(10)).await;

        tasks.prune_finished();
        let keys: Vec<_> = tasks.running_keys().map(TaskKey::name).collect();
        assert_eq!(keys, vec!["users"]);
    }
}
