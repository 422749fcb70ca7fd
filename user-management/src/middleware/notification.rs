//! Success and error notifications for async operations
//!
//! Runs before the reducer on every action and turns operation outcomes
//! into user-visible [`Notification`]s:
//!
//! - explicit texts from the ticket's [`Meta`](crate::action::Meta) win
//! - success alerts come from the `*app-alert` / `*app-params` headers
//! - HTTP failures are classified by status, with special handling of
//!   `400` validation problems
//!
//! Every text goes through the translator before it reaches the notifier.

use std::sync::LazyLock;

use admin_dispatch::{Action, Middleware};
use regex::Regex;
use reqwest::Method;
use serde_json::Value;

use crate::action::{Envelope, Failure};
use crate::api::{ErrorResponse, RequestError, RequestInfo, Response};
use crate::i18n::{params, Params, Translate};
use crate::notify::{Notification, Notifier};

const UNKNOWN_ERROR: &str = "Unknown error!";

/// Size-like validation constraints that share the `error.Size` text.
const SIZE_CONSTRAINTS: &[&str] = &["Min", "Max", "DecimalMin", "DecimalMax"];

static FIELD_INDEX: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\[\d*\]").ok());

/// Settings of the notification middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    /// Translation prefix of entity field names (`<prefix>.<entity>.<field>`)
    pub app_prefix: String,
    /// 401 failures on these paths are expected and stay silent
    pub auth_paths: Vec<String>,
    /// A `GET` to this path that gets no response is only logged
    pub account_check_url: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            app_prefix: "jhtestApp".to_string(),
            auth_paths: vec!["/api/account".to_string(), "/api/authenticate".to_string()],
            account_check_url: "api/account".to_string(),
        }
    }
}

impl NotificationConfig {
    pub fn with_app_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.app_prefix = prefix.into();
        self
    }
}

/// Middleware emitting notifications for operation outcomes.
#[derive(Debug)]
pub struct NotificationMiddleware<T, N> {
    translator: T,
    notifier: N,
    config: NotificationConfig,
}

impl<T: Translate, N: Notifier> NotificationMiddleware<T, N> {
    pub fn new(translator: T, notifier: N) -> Self {
        Self::with_config(translator, notifier, NotificationConfig::default())
    }

    pub fn with_config(translator: T, notifier: N, config: NotificationConfig) -> Self {
        Self {
            translator,
            notifier,
            config,
        }
    }

    pub fn translator(&self) -> &T {
        &self.translator
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    pub fn config(&self) -> &NotificationConfig {
        &self.config
    }

    fn success(&mut self, text: String) {
        self.notifier.notify(Notification::success(text));
    }

    fn error(&mut self, text: String) {
        self.notifier.notify(Notification::error(text));
    }

    /// Translate `key` (or `message` itself when there is no key) and emit
    /// it as an error. `message` is the text for unknown keys.
    fn error_alert(&mut self, message: &str, key: Option<&str>, params: &Params) {
        let key = key.unwrap_or(message);
        let text = self.translator.translate(key, params, Some(message));
        self.error(text);
    }

    fn on_response(&mut self, response: &Response) {
        let Some(alert) = response.headers.find_suffix("app-alert") else {
            return;
        };
        let mut params = Params::new();
        if let Some(param) = response.headers.find_suffix("app-params") {
            params.insert("param".to_string(), decode_param(param));
        }
        let text = self.translator.translate(alert, &params, None);
        self.success(text);
    }

    fn on_failure(&mut self, failure: &Failure) {
        match failure {
            Failure::Http(RequestError::Unreachable { .. }) => {
                self.error_alert(
                    "Server not reachable",
                    Some("error.server.not.reachable"),
                    &Params::new(),
                );
            }
            Failure::Http(RequestError::Status { request, response }) => {
                self.on_error_response(request, response);
            }
            Failure::Http(RequestError::NoResponse { request, message }) => {
                if request.method == Method::GET && request.path == self.config.account_check_url {
                    tracing::info!(
                        "Authentication Error: Trying to access url {} with GET.",
                        request.path
                    );
                } else if message.is_empty() {
                    self.error(UNKNOWN_ERROR.to_string());
                } else {
                    self.error(message.clone());
                }
            }
            Failure::Unexpected(reason) => {
                tracing::debug!(%reason, "unexpected failure");
                self.error(UNKNOWN_ERROR.to_string());
            }
        }
    }

    fn on_error_response(&mut self, request: &RequestInfo, response: &ErrorResponse) {
        if response.status == 401 && self.is_auth_path(request, response) {
            return;
        }

        match response.status {
            0 => self.error_alert(
                "Server not reachable",
                Some("error.server.not.reachable"),
                &Params::new(),
            ),
            400 => self.on_bad_request(response),
            404 => self.error_alert("Not found", Some("error.url.not.found"), &Params::new()),
            _ => match problem_message(response) {
                Some(message) => self.error_alert(message, None, &Params::new()),
                None => self.raw_body_alert(response),
            },
        }
    }

    fn on_bad_request(&mut self, response: &ErrorResponse) {
        if let Some(error_key) = response.headers.find_suffix("app-error") {
            let params = match response.headers.find_suffix("app-params") {
                Some(entity_key) => {
                    let entity_name = self.translator.translate(
                        &format!("global.menu.entities.{entity_key}"),
                        &Params::new(),
                        None,
                    );
                    params([("entityName", entity_name)])
                }
                None => Params::new(),
            };
            self.error_alert(error_key, Some(error_key), &params);
            return;
        }

        let problem = response.problem.as_ref();
        if let Some(field_errors) = problem.and_then(|p| p.field_errors.as_ref()) {
            for field_error in field_errors {
                let message = if SIZE_CONSTRAINTS.contains(&field_error.message.as_str()) {
                    "Size"
                } else {
                    field_error.message.as_str()
                };
                let field = normalize_field_path(&field_error.field);
                let field_name = self.translator.translate(
                    &format!(
                        "{}.{}.{}",
                        self.config.app_prefix, field_error.object_name, field
                    ),
                    &Params::new(),
                    None,
                );
                let fallback = format!("Error on field \"{field_name}\"");
                let params = params([("fieldName", field_name)]);
                self.error_alert(&fallback, Some(&format!("error.{message}")), &params);
            }
        } else if let Some(message) = problem_message(response) {
            let params = problem
                .and_then(|p| p.params.as_ref())
                .map(params_from_json)
                .unwrap_or_default();
            self.error_alert(message, Some(message), &params);
        } else {
            self.raw_body_alert(response);
        }
    }

    fn raw_body_alert(&mut self, response: &ErrorResponse) {
        let body = if response.body.trim().is_empty() {
            UNKNOWN_ERROR
        } else {
            response.body.as_str()
        };
        self.error_alert(body, None, &Params::new());
    }

    /// 401 on the login and account endpoints is the normal "not logged
    /// in" answer.
    fn is_auth_path(&self, request: &RequestInfo, response: &ErrorResponse) -> bool {
        let path = response
            .problem
            .as_ref()
            .and_then(|p| p.path.as_deref())
            .unwrap_or(&request.url);
        self.config
            .auth_paths
            .iter()
            .any(|auth_path| path.contains(auth_path.as_str()))
    }
}

impl<A, T, N> Middleware<A> for NotificationMiddleware<T, N>
where
    A: Action + Envelope,
    T: Translate,
    N: Notifier,
{
    fn before(&mut self, action: &A) {
        let meta = action.meta();

        if let Some(text) = meta.and_then(|m| m.success_message.as_ref()) {
            self.success(text.clone());
        } else if let Some(response) = action.response() {
            self.on_response(response);
        }

        if let Some(text) = meta.and_then(|m| m.error_message.as_ref()) {
            self.error(text.clone());
        } else if let Some(failure) = action.failure() {
            self.on_failure(failure);
        }
    }

    fn after(&mut self, _action: &A, _state_changed: bool) {}
}

/// Non-empty `message` of the response's problem document.
fn problem_message(response: &ErrorResponse) -> Option<&str> {
    response
        .problem
        .as_ref()
        .and_then(|p| p.message.as_deref())
        .filter(|m| !m.is_empty())
}

/// Decode a header parameter: `+` is a space, the rest is percent-encoded.
fn decode_param(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

/// `users[3].roles[0].id` -> `users[].roles[].id`
fn normalize_field_path(field: &str) -> String {
    match FIELD_INDEX.as_ref() {
        Some(index) => index.replace_all(field, "[]").into_owned(),
        None => field.to_string(),
    }
}

fn params_from_json(value: &Value) -> Params {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| {
                let v = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), v)
            })
            .collect(),
        _ => Params::new(),
    }
}
