//! user-admin - command line user administration
//!
//! Dispatches one intent through the user-management store, waits for the
//! request lifecycle to settle, then prints notifications to stderr and
//! the resulting state as JSON to stdout.
//!
//! # Usage
//!
//! ```sh
//! user-admin --token "$JWT" list --sort login,asc
//! user-admin create --login alice --email alice@example.com --authority ROLE_USER
//! user-admin delete alice
//! ```
//!
//! Exits with status 1 when the request failed.

use std::sync::Arc;

use admin_dispatch::{
    ActionLogConfig, ActionLoggerMiddleware, EffectRuntime, EffectStoreWithMiddleware,
};
use anyhow::Context;
use clap::Parser;
use user_management::config::{init_tracing, Args, Config};
use user_management::middleware::RelayMiddleware;
use user_management::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_args(Args::parse())?;
    init_tracing(config.verbose);

    let catalog = match &config.catalog {
        Some(path) => Catalog::from_path(path)
            .with_context(|| format!("loading catalog {}", path.display()))?,
        None => Catalog::new(),
    };
    let client = AdminClient::new(config.client.clone()).context("building HTTP client")?;
    let client = Arc::new(client);

    let (notifier, mut notifications) = ChannelNotifier::channel();
    let (relay, mut activity) = RelayMiddleware::channel();
    let pipeline = Pipeline::new(NotificationMiddleware::with_config(
        catalog,
        notifier,
        config.notification.clone(),
    ))
    .with_relay(relay)
    .with_logger(ActionLoggerMiddleware::with_log(ActionLogConfig::default()));

    let store = EffectStoreWithMiddleware::new(UserManagementState::new(), reducer, pipeline);
    let mut runtime = EffectRuntime::from_store(store);

    let cancel = runtime.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling requests");
            cancel.cancel();
        }
    });

    let action = config.command.into_action();
    tracing::debug!(?action, "dispatching");
    runtime.enqueue(action);

    let processed = runtime
        .run_until_idle(|effect, ctx| handle_effect(&client, effect, ctx))
        .await;
    tracing::debug!(processed, "runtime idle");

    if let Some(log) = runtime.store().middleware().logger().log() {
        for entry in log.entries() {
            tracing::debug!(
                seq = entry.sequence,
                age = %entry.elapsed_display(),
                changed = ?entry.state_changed,
                "{}",
                entry.summary
            );
        }
    }

    while let Ok(event) = activity.try_recv() {
        tracing::info!(
            action = event.action,
            login = ?event.login,
            status = event.status,
            "relayed"
        );
    }
    while let Ok(notification) = notifications.try_recv() {
        eprintln!("{notification}");
    }

    let state = runtime.state();
    println!(
        "{}",
        serde_json::to_string_pretty(state).context("serializing state")?
    );

    if state.error_message.is_some() {
        std::process::exit(1);
    }
    Ok(())
}
