//! Action logging with pattern-based filtering and in-memory storage
//!
//! The last stage of the pipeline. Every action that passes the filter is
//! logged through `tracing` and, optionally, kept in a bounded ring buffer
//! so a caller can print a trail of what happened after a run.
//!
//! # Example
//!
//! ```ignore
//! use admin_dispatch::logger::{ActionLogConfig, ActionLoggerConfig, ActionLoggerMiddleware};
//!
//! // Everything except the lifecycle noise of pending actions
//! let config = ActionLoggerConfig::new(None, Some("DidStart"));
//! let middleware = ActionLoggerMiddleware::new(config);
//!
//! // Same, but also remember the last 50 actions
//! let middleware = ActionLoggerMiddleware::with_log(ActionLogConfig::with_capacity(50));
//! ```

use std::collections::VecDeque;
use std::time::Instant;

use crate::action::ActionSummary;
use crate::store::Middleware;

/// Include/exclude filter over action names.
///
/// Patterns are globs: `*` matches any run of characters, `?` exactly one.
/// `User*` matches `UserCreate` and `UserDelete`; `Did*` matches every
/// lifecycle result.
#[derive(Debug, Clone, Default)]
pub struct ActionLoggerConfig {
    /// If non-empty, only log actions matching one of these patterns
    pub include_patterns: Vec<String>,
    /// Never log actions matching these patterns (applied after include)
    pub exclude_patterns: Vec<String>,
}

impl ActionLoggerConfig {
    /// Build a filter from comma-separated pattern lists.
    ///
    /// # Example
    /// ```
    /// use admin_dispatch_core::logger::ActionLoggerConfig;
    ///
    /// let config = ActionLoggerConfig::new(Some("User*, Did*"), Some("DidStart"));
    /// assert!(config.should_log("UserCreate"));
    /// assert!(config.should_log("DidSucceed"));
    /// assert!(!config.should_log("DidStart"));
    /// assert!(!config.should_log("RolesFetch"));
    /// ```
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Self {
        Self {
            include_patterns: include.map(split_patterns).unwrap_or_default(),
            exclude_patterns: exclude.map(split_patterns).unwrap_or_default(),
        }
    }

    pub fn with_patterns(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self {
            include_patterns: include,
            exclude_patterns: exclude,
        }
    }

    /// An empty include list admits every name; excludes always win.
    pub fn should_log(&self, action_name: &str) -> bool {
        let matches = |patterns: &[String]| patterns.iter().any(|p| glob_match(p, action_name));
        (self.include_patterns.is_empty() || matches(&self.include_patterns))
            && !matches(&self.exclude_patterns)
    }
}

fn split_patterns(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// One recorded action.
#[derive(Debug, Clone)]
pub struct ActionLogEntry {
    pub name: &'static str,
    /// [`ActionSummary::summary`] at dispatch time
    pub summary: String,
    pub timestamp: Instant,
    /// Monotonic across evictions
    pub sequence: u64,
    /// `None` until the reducer ran
    pub state_changed: Option<bool>,
}

impl ActionLogEntry {
    pub fn new(name: &'static str, summary: String, sequence: u64) -> Self {
        Self {
            name,
            summary,
            timestamp: Instant::now(),
            sequence,
            state_changed: None,
        }
    }

    /// Age of the entry, `150ms` below a second and `2.3s` above.
    pub fn elapsed_display(&self) -> String {
        match self.timestamp.elapsed() {
            age if age.as_secs() == 0 => format!("{}ms", age.as_millis()),
            age => format!("{:.1}s", age.as_secs_f64()),
        }
    }
}

/// Size and filter of an [`ActionLog`].
#[derive(Debug, Clone)]
pub struct ActionLogConfig {
    pub capacity: usize,
    pub filter: ActionLoggerConfig,
}

impl Default for ActionLogConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            filter: ActionLoggerConfig::default(),
        }
    }
}

impl ActionLogConfig {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    pub fn new(capacity: usize, filter: ActionLoggerConfig) -> Self {
        Self { capacity, filter }
    }
}

/// Bounded, in-memory record of recent actions. Oldest entries are dropped first.
#[derive(Debug, Clone)]
pub struct ActionLog {
    entries: VecDeque<ActionLogEntry>,
    config: ActionLogConfig,
    next_sequence: u64,
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new(ActionLogConfig::default())
    }
}

impl ActionLog {
    pub fn new(config: ActionLogConfig) -> Self {
        Self {
            entries: VecDeque::with_capacity(config.capacity),
            config,
            next_sequence: 0,
        }
    }

    /// Record an action if it passes the filter.
    ///
    /// Returns the new entry, or `None` if the action was filtered out.
    pub fn log<A: ActionSummary>(&mut self, action: &A) -> Option<&ActionLogEntry> {
        let name = action.name();
        if !self.config.filter.should_log(name) || self.config.capacity == 0 {
            return None;
        }

        let entry = ActionLogEntry::new(name, action.summary(), self.next_sequence);
        self.next_sequence += 1;

        if self.entries.len() >= self.config.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
        self.entries.back()
    }

    pub fn update_last_state_changed(&mut self, changed: bool) {
        if let Some(entry) = self.entries.back_mut() {
            entry.state_changed = Some(changed);
        }
    }

    /// Oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter()
    }

    /// The `count` newest entries, newest first.
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter().rev().take(count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Middleware that logs actions with configurable pattern filtering.
///
/// Logs through `tracing::debug!` and, when built with
/// [`with_log`](Self::with_log), also records entries in an [`ActionLog`].
#[derive(Debug, Clone)]
pub struct ActionLoggerMiddleware {
    config: ActionLoggerConfig,
    log: Option<ActionLog>,
    // Whether the action seen in `before` made it into the log
    last_action_logged: bool,
    active: bool,
}

impl Default for ActionLoggerMiddleware {
    fn default() -> Self {
        Self::new(ActionLoggerConfig::default())
    }
}

impl ActionLoggerMiddleware {
    /// Logger writing to `tracing` only.
    pub fn new(config: ActionLoggerConfig) -> Self {
        Self {
            config,
            log: None,
            last_action_logged: false,
            active: true,
        }
    }

    /// Logger that also keeps an [`ActionLog`].
    pub fn with_log(config: ActionLogConfig) -> Self {
        Self {
            config: config.filter.clone(),
            log: Some(ActionLog::new(config)),
            last_action_logged: false,
            active: true,
        }
    }

    /// Enable or disable the logger. An inactive logger does nothing.
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn log(&self) -> Option<&ActionLog> {
        self.log.as_ref()
    }

    pub fn config(&self) -> &ActionLoggerConfig {
        &self.config
    }
}

impl<A: ActionSummary> Middleware<A> for ActionLoggerMiddleware {
    fn before(&mut self, action: &A) {
        if !self.active {
            return;
        }

        let name = action.name();
        if self.config.should_log(name) {
            tracing::debug!(action = %name, summary = %action.summary(), "action");
        }

        self.last_action_logged = self
            .log
            .as_mut()
            .is_some_and(|log| log.log(action).is_some());
    }

    fn after(&mut self, action: &A, state_changed: bool) {
        if !self.active || !self.last_action_logged {
            return;
        }

        if let Some(log) = self.log.as_mut() {
            log.update_last_state_changed(state_changed);
        }
        tracing::trace!(action = %action.name(), state_changed, "action reduced");
    }
}

/// Glob matching supporting `*` (any run, possibly empty) and `?` (one char).
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut pi, mut ti) = (0, 0);
    // Position of the last `*` seen and the text index it is anchored at
    let mut backtrack: Option<(usize, usize)> = None;

    while ti < text.len() {
        match pattern.get(pi) {
            Some('*') => {
                backtrack = Some((pi, ti));
                pi += 1;
            }
            Some(&c) if c == '?' || c == text[ti] => {
                pi += 1;
                ti += 1;
            }
            _ => match backtrack {
                Some((star_pi, star_ti)) => {
                    pi = star_pi + 1;
                    ti = star_ti + 1;
                    backtrack = Some((star_pi, star_ti + 1));
                }
                None => return false,
            },
        }
    }

    pattern[pi..].iter().all(|&c| c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_match() {
        assert!(glob_match("RolesFetch", "RolesFetch"));
        assert!(!glob_match("RolesFetch", "RolesFetched"));

        assert!(glob_match("User*", "UserCreate"));
        assert!(glob_match("User*", "User"));
        assert!(glob_match("User*", "UsersFetch"));
        assert!(!glob_match("User*", "RolesFetch"));
        assert!(glob_match("*Fetch", "UsersAdminFetch"));
        assert!(glob_match("*Admin*", "UsersAdminFetch"));
        assert!(glob_match("Users*Fetch", "UsersAdminFetch"));

        assert!(glob_match("Did?????", "DidStart"));
        assert!(!glob_match("Did?????", "DidFail"));
    }

    #[test]
    fn test_config_include_and_exclude() {
        let config = ActionLoggerConfig::new(Some("Did*"), Some("DidStart"));
        assert!(config.should_log("DidSucceed"));
        assert!(config.should_log("DidFail"));
        assert!(!config.should_log("DidStart"));
        assert!(!config.should_log("UserCreate"));
    }

    #[test]
    fn test_config_default_logs_everything() {
        let config = ActionLoggerConfig::default();
        assert!(config.should_log("DidStart"));
        assert!(config.should_log("UserManagementReset"));
    }

    #[test]
    fn test_config_ignores_empty_patterns() {
        let config = ActionLoggerConfig::new(Some(" , "), None);
        assert!(config.include_patterns.is_empty());
        assert!(config.should_log("UserDelete"));
    }

    #[derive(Clone, Debug)]
    enum TestAction {
        Start,
        Succeed(u32),
    }

    impl crate::Action for TestAction {
        fn name(&self) -> &'static str {
            match self {
                TestAction::Start => "DidStart",
                TestAction::Succeed(_) => "DidSucceed",
            }
        }
    }

    impl crate::ActionSummary for TestAction {}

    #[test]
    fn test_action_log_capacity() {
        let mut log = ActionLog::new(ActionLogConfig::with_capacity(2));

        log.log(&TestAction::Start);
        log.log(&TestAction::Succeed(1));
        log.log(&TestAction::Succeed(2));

        assert_eq!(log.len(), 2);
        let sequences: Vec<_> = log.entries().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![1, 2]);

        let newest = log.recent(1).next().map(|e| e.summary.clone());
        assert_eq!(newest.as_deref(), Some("Succeed(2)"));
    }

    #[test]
    fn test_middleware_records_state_changes() {
        let config = ActionLogConfig::new(10, ActionLoggerConfig::new(None, Some("DidStart")));
        let mut middleware = ActionLoggerMiddleware::with_log(config);

        middleware.before(&TestAction::Succeed(1));
        middleware.after(&TestAction::Succeed(1), true);

        // Filtered action must not overwrite the previous entry's outcome
        middleware.before(&TestAction::Start);
        middleware.after(&TestAction::Start, false);

        let log = middleware.log().expect("log enabled");
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries().next().and_then(|e| e.state_changed), Some(true));
    }

    #[test]
    fn test_inactive_middleware_records_nothing() {
        let mut middleware =
            ActionLoggerMiddleware::with_log(ActionLogConfig::default()).active(false);

        middleware.before(&TestAction::Start);
        middleware.after(&TestAction::Start, true);

        assert!(!middleware.is_active());
        assert!(middleware.log().is_some_and(ActionLog::is_empty));
    }

    #[test]
    fn test_entry_elapsed_display() {
        let entry = ActionLogEntry::new("DidStart", "DidStart".to_string(), 0);
        assert!(entry.elapsed_display().ends_with("ms"));
    }
}
