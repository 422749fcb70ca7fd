//! Middleware pipeline of the user-management store
//!
//! Every dispatched action passes these stages, in order:
//!
//! 1. [`ErrorMiddleware`]: logs rejections
//! 2. [`NotificationMiddleware`]: success and error notifications
//! 3. [`LoadingBarMiddleware`]: in-flight counter for a loading indicator
//! 4. [`RelayMiddleware`]: forwards completed writes
//! 5. [`ActionLoggerMiddleware`]: action log
//!
//! `before` hooks run in that order, `after` hooks in reverse.

mod error;
mod notification;
mod relay;

pub use error::{describe_problem, ErrorMiddleware};
pub use notification::{NotificationConfig, NotificationMiddleware};
pub use relay::{ActivityEvent, RelayMiddleware};

use admin_dispatch::{
    ActionLoggerMiddleware, ActionSummary, Lifecycle, LoadingBar, LoadingBarMiddleware, Middleware,
};

use crate::action::Envelope;
use crate::i18n::Translate;
use crate::notify::Notifier;

/// The ordered middleware chain.
pub struct Pipeline<T, N> {
    error: ErrorMiddleware,
    notification: NotificationMiddleware<T, N>,
    loading: LoadingBarMiddleware,
    relay: RelayMiddleware,
    logger: ActionLoggerMiddleware,
}

impl<T: Translate, N: Notifier> Pipeline<T, N> {
    /// Pipeline with a fresh loading bar, no relay transport and a
    /// tracing-only action logger.
    pub fn new(notification: NotificationMiddleware<T, N>) -> Self {
        Self {
            error: ErrorMiddleware::new(),
            notification,
            loading: LoadingBarMiddleware::default(),
            relay: RelayMiddleware::disconnected(),
            logger: ActionLoggerMiddleware::default(),
        }
    }

    pub fn with_loading_bar(mut self, bar: LoadingBar) -> Self {
        self.loading = LoadingBarMiddleware::new(bar);
        self
    }

    pub fn with_relay(mut self, relay: RelayMiddleware) -> Self {
        self.relay = relay;
        self
    }

    pub fn with_logger(mut self, logger: ActionLoggerMiddleware) -> Self {
        self.logger = logger;
        self
    }

    pub fn error(&self) -> &ErrorMiddleware {
        &self.error
    }

    pub fn notification(&self) -> &NotificationMiddleware<T, N> {
        &self.notification
    }

    pub fn notification_mut(&mut self) -> &mut NotificationMiddleware<T, N> {
        &mut self.notification
    }

    pub fn loading_bar(&self) -> &LoadingBar {
        self.loading.bar()
    }

    pub fn relay(&self) -> &RelayMiddleware {
        &self.relay
    }

    pub fn logger(&self) -> &ActionLoggerMiddleware {
        &self.logger
    }
}

impl<A, T, N> Middleware<A> for Pipeline<T, N>
where
    A: Envelope + Lifecycle + ActionSummary,
    T: Translate,
    N: Notifier,
{
    fn before(&mut self, action: &A) {
        self.error.before(action);
        self.notification.before(action);
        self.loading.before(action);
        self.relay.before(action);
        self.logger.before(action);
    }

    fn after(&mut self, action: &A, state_changed: bool) {
        self.logger.after(action, state_changed);
        self.relay.after(action, state_changed);
        self.loading.after(action, state_changed);
        self.notification.after(action, state_changed);
        self.error.after(action, state_changed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admin_dispatch::{ActionLogConfig, EffectStoreWithMiddleware};

    use crate::action::{Action, Failure, Operation, RequestId, Ticket};
    use crate::api::{Data, Response};
    use crate::i18n::Catalog;
    use crate::model::{Headers, PageRequest};
    use crate::notify::{ChannelNotifier, Notification};
    use crate::reducer::reducer;
    use crate::state::UserManagementState;

    #[test]
    fn test_pipeline_runs_all_stages() {
        let (notifier, mut notifications) = ChannelNotifier::channel();
        let (relay, mut events) = RelayMiddleware::channel();
        let pipeline = Pipeline::new(NotificationMiddleware::new(Catalog::new(), notifier))
            .with_relay(relay)
            .with_logger(ActionLoggerMiddleware::with_log(ActionLogConfig::default()));
        let mut store =
            EffectStoreWithMiddleware::new(UserManagementState::new(), reducer, pipeline);

        // Intent, then the lifecycle the effect handler would report
        let result = store.dispatch(Action::UserDelete("alice".into()));
        let ticket = match result.effects.as_slice() {
            [crate::effect::Effect::Call(ticket, _)] => ticket.clone(),
            other => panic!("unexpected effects {other:?}"),
        };
        store.dispatch(Action::DidStart(ticket.clone()));
        assert!(store.middleware().loading_bar().is_visible());
        assert!(store.state().updating);

        store.dispatch(Action::DidSucceed(
            ticket,
            Response::new(
                204,
                Headers::new().with("X-jhtestApp-Alert", "userManagement.deleted"),
                Data::Empty,
            ),
        ));

        let pipeline = store.middleware();
        assert!(!pipeline.loading_bar().is_visible());
        assert_eq!(pipeline.relay().sent(), 1);
        assert_eq!(events.try_recv().unwrap().action, "userManagement/DELETE_USER");
        assert_eq!(
            notifications.try_recv().unwrap(),
            Notification::success("translation-not-found[userManagement.deleted]")
        );

        let log = pipeline.logger().log().unwrap();
        let names: Vec<_> = log.entries().map(|e| e.name).collect();
        assert_eq!(names, vec!["UserDelete", "DidStart", "DidSucceed"]);
    }

    #[test]
    fn test_rejection_reaches_error_and_notification_stages() {
        let (notifier, mut notifications) = ChannelNotifier::channel();
        let mut pipeline = Pipeline::new(NotificationMiddleware::new(Catalog::new(), notifier));
        let ticket = Ticket::new(Operation::FetchRoles, RequestId(1));

        pipeline.before(&Action::DidStart(ticket.clone()));
        pipeline.before(&Action::DidFail(ticket, Failure::Unexpected("boom".into())));
        pipeline.after(&Action::RolesFetch, false);

        assert_eq!(pipeline.error().seen(), 1);
        assert_eq!(pipeline.loading_bar().in_flight(), 0);
        assert_eq!(
            notifications.try_recv().unwrap(),
            Notification::error("Unknown error!")
        );
        assert!(notifications.try_recv().is_err());
        // Plain intents pass straight through
        pipeline.before(&Action::UsersFetch(PageRequest::default()));
        assert!(notifications.try_recv().is_err());
    }
}
