//! user-management: headless admin client for a user REST API
//!
//! A single state slice (`UserManagementState`) driven by an async CRUD
//! reducer, behind a middleware pipeline that logs rejections and turns
//! results into user-facing notifications.
//!
//! # Wiring
//!
//! ```ignore
//! use std::sync::Arc;
//! use admin_dispatch::{EffectRuntime, EffectStoreWithMiddleware};
//! use user_management::prelude::*;
//!
//! let (notifier, mut notifications) = ChannelNotifier::channel();
//! let pipeline = Pipeline::new(NotificationMiddleware::new(Catalog::new(), notifier));
//! let store = EffectStoreWithMiddleware::new(UserManagementState::new(), reducer, pipeline);
//! let mut runtime = EffectRuntime::from_store(store);
//!
//! let client = Arc::new(AdminClient::new(ClientConfig::new(base_url))?);
//! runtime.enqueue(Action::UsersAdminFetch(PageRequest::default()));
//! runtime.run_until_idle(|effect, ctx| handle_effect(&client, effect, ctx)).await;
//! ```

pub mod action;
pub mod api;
pub mod config;
pub mod effect;
pub mod i18n;
pub mod middleware;
pub mod model;
pub mod notify;
pub mod reducer;
pub mod state;

pub use action::{Action, Envelope, Failure, Meta, Operation, RequestId, Slot, Ticket};
pub use api::{AdminClient, Backend, Call, ClientConfig, Data, RequestError, Response};
pub use effect::{handle_effect, Effect};
pub use i18n::{Catalog, Translate};
pub use middleware::{NotificationConfig, NotificationMiddleware, Pipeline};
pub use model::{Headers, PageRequest, User};
pub use notify::{ChannelNotifier, Level, Notification, Notifier};
pub use reducer::reducer;
pub use state::UserManagementState;

pub mod prelude {
    pub use crate::action::{Action, Envelope, Failure, Operation, Ticket};
    pub use crate::api::{AdminClient, Backend, Call, ClientConfig, Data, Response};
    pub use crate::effect::{handle_effect, Effect};
    pub use crate::i18n::{Catalog, Translate};
    pub use crate::middleware::{
        ErrorMiddleware, NotificationMiddleware, Pipeline, RelayMiddleware,
    };
    pub use crate::model::{PageRequest, User};
    pub use crate::notify::{ChannelNotifier, Notification, Notifier};
    pub use crate::reducer::reducer;
    pub use crate::state::UserManagementState;
}
